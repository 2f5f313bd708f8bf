use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A commit-message convention: a primary classifying expression plus an
/// ordered map of bump identifiers to expressions evaluated against the
/// captured groups.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommitMessageConvention {
    /// Regular expression with named captures; `type` and `breaking` are the
    /// groups the matcher relies on.
    pub expression: String,
    /// Bump identifier to expression over `name=value` capture lines, in
    /// evaluation order.
    pub bump_expressions: IndexMap<String, String>,
}

impl CommitMessageConvention {
    /// The Conventional Commits convention. Bump expressions are evaluated
    /// against the `name=value` rendition of the captured groups.
    #[must_use]
    pub fn conventional_commits() -> Self {
        Self {
            expression: r"^(?P<type>[a-zA-Z0-9_]+)(\((?P<scope>[^)]+)\))?(?P<breaking>!)?: (?P<title>.+)".to_string(),
            bump_expressions: IndexMap::from([
                ("major".to_string(), r"(?m)^breaking=!$".to_string()),
                ("minor".to_string(), r"(?m)^type=feat$".to_string()),
                ("patch".to_string(), r"(?m)^type=(fix|perf)$".to_string()),
            ]),
        }
    }
}

/// The policy a release follows on a matching branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReleaseType {
    /// Regular expression the current branch name must match.
    pub branch_filter: String,
    /// Environment variables that must exist and match their expression.
    pub environment_predicates: IndexMap<String, String>,
    /// Whether releases on this branch collapse into a prerelease lane.
    pub collapsed_versioning: bool,
    /// Template for the prerelease qualifier used when collapsing.
    pub collapsed_version_qualifier: Option<String>,
    /// Regular expression the inferred version must satisfy.
    pub version_range: Option<String>,
    /// Derive the version range from the trailing part of the branch name.
    pub version_range_from_branch_name: bool,
    pub publish: bool,
    pub git_commit: bool,
    /// Template for the release commit message.
    pub git_commit_message: Option<String>,
    pub git_tag: bool,
    /// Template for the tag message; when set the tag is annotated.
    pub git_tag_message: Option<String>,
    pub git_push: bool,
    /// Template for the body of the published release.
    pub publish_message: Option<String>,
}

impl Default for ReleaseType {
    fn default() -> Self {
        Self {
            branch_filter: ".*".to_string(),
            environment_predicates: IndexMap::new(),
            collapsed_versioning: false,
            collapsed_version_qualifier: None,
            version_range: None,
            version_range_from_branch_name: false,
            publish: false,
            git_commit: false,
            git_commit_message: None,
            git_tag: false,
            git_tag_message: None,
            git_push: false,
            publish_message: None,
        }
    }
}

impl ReleaseType {
    /// The policy used on primary branches: tag, push and publish, never
    /// collapse.
    #[must_use]
    pub fn mainline() -> Self {
        Self {
            branch_filter: "^(master|main)$".to_string(),
            git_tag: true,
            git_push: true,
            publish: true,
            ..Self::default()
        }
    }

    /// The catch-all policy for every other branch: infer only, no
    /// repository mutation, collapsed under the `internal` qualifier.
    #[must_use]
    pub fn internal() -> Self {
        Self {
            branch_filter: ".*".to_string(),
            collapsed_versioning: true,
            collapsed_version_qualifier: Some("internal".to_string()),
            ..Self::default()
        }
    }
}

/// An artifact produced by the Make command through an asset service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Asset {
    /// Output path, rendered as a template against the state.
    pub path: String,
    /// Name of the asset service building this asset; assets without a
    /// service are skipped.
    pub service: Option<String>,
}

/// The hosting service a release is published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    GitHub,
    GitLab,
}

/// Credentials and coordinates for a publish service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    pub provider: Provider,
    pub repository_owner: Option<String>,
    pub repository_name: Option<String>,
    pub user: Option<String>,
    /// Token value, rendered as a template so it can be pulled from the
    /// environment.
    pub token: Option<String>,
}

/// A composite configuration block: an ordered selection of enabled item
/// names plus the item definitions, both overridable per layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemsBlock<T> {
    pub enabled: Option<Vec<String>>,
    pub items: IndexMap<String, T>,
}

impl<T> Default for ItemsBlock<T> {
    fn default() -> Self {
        Self {
            enabled: None,
            items: IndexMap::new(),
        }
    }
}
