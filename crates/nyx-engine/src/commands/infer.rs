use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, info};

use nyx_config::{ConfigError, ReleaseType};
use nyx_git::{Commit, Repository};
use nyx_version::{Bump, Scheme, Version};

use crate::services::ServiceRegistry;
use crate::state::{ReleaseScope, State};
use crate::{matcher, selector, NyxError, Result};

use super::Command;

const INTERNAL_LAST_COMMIT: &str = "Infer.last.commit";
const INTERNAL_BRANCH: &str = "Infer.last.branch";
const INTERNAL_CONFIGURED_BUMP: &str = "Infer.configured.bump";
const INTERNAL_CONFIGURED_VERSION: &str = "Infer.configured.version";
const INTERNAL_CONFIGURED_RELEASE_PREFIX: &str = "Infer.configured.releasePrefix";
const INTERNAL_CONFIGURED_SCHEME: &str = "Infer.configured.scheme";
const INTERNAL_STATE_VERSION: &str = "Infer.state.version";

/// Computes the release scope and the next version: selects the release type
/// for the current branch, walks the first-parent history back to the most
/// recent matching version tag, classifies the commits in between, and bumps
/// the previous version accordingly.
pub(crate) struct Infer;

impl Command for Infer {
    fn name(&self) -> &'static str {
        "Infer"
    }

    fn is_up_to_date(&self, state: &State, repository: &Repository) -> Result<bool> {
        if state.version.is_none() {
            return Ok(false);
        }
        let Ok(latest) = repository.latest_commit() else {
            return Ok(false);
        };
        let branch = repository.current_branch();

        let configuration = state.configuration();
        Ok(state.internal_matches(INTERNAL_LAST_COMMIT, &latest)
            && state.internal_matches(INTERNAL_BRANCH, &branch)
            && state.internal_matches(
                INTERNAL_CONFIGURED_BUMP,
                &configuration.get_bump().unwrap_or_default(),
            )
            && state.internal_matches(
                INTERNAL_CONFIGURED_VERSION,
                &configuration.get_version().unwrap_or_default(),
            )
            && state.internal_matches(
                INTERNAL_CONFIGURED_RELEASE_PREFIX,
                &configuration.get_release_prefix(),
            )
            && state.internal_matches(
                INTERNAL_CONFIGURED_SCHEME,
                &configuration.get_scheme().to_string(),
            )
            && state
                .version
                .as_deref()
                .is_some_and(|version| state.internal_matches(INTERNAL_STATE_VERSION, version)))
    }

    fn run(
        &self,
        state: &mut State,
        repository: &Repository,
        _services: &ServiceRegistry,
    ) -> Result<()> {
        debug!("running the Infer command");

        let configuration = state.configuration();
        let scheme = state.scheme();
        let prefix = configuration.get_release_prefix();
        let lenient = configuration.get_release_lenient();
        let bump_override = configuration.get_bump();
        let version_override = configuration.get_version();
        let initial_version = configuration.get_initial_version();
        let conventions = configuration.get_commit_message_conventions()?;
        let release_types = configuration.get_release_types()?;
        let dry_run = configuration.get_dry_run();

        // detached HEAD reaches the selector as the empty branch name
        let branch = repository.current_branch();
        let (type_name, release_type) = selector::select_release_type(&branch, &release_types)?;
        state.branch = Some(branch.clone());
        state.release_type = Some(type_name);

        let version_range = resolve_version_range(&branch, &release_type)?;

        // Walk back to the most recent commit carrying an acceptable version
        // tag; everything newer is the release scope.
        let mut commits: Vec<Commit> = Vec::new();
        let mut previous: Option<(Version, String)> = None;
        let mut tag_versions: Vec<Version> = Vec::new();
        repository.walk_history(None, None, |commit| {
            let mut best: Option<Version> = None;
            for tag in &commit.tags {
                let Some(version) = parse_tag_version(&tag.name, scheme, &prefix, lenient) else {
                    continue;
                };
                tag_versions.push(version.clone());
                let accepted = version_range
                    .as_ref()
                    .is_none_or(|range| range.is_match(&version.to_string()));
                // among tags on a single commit the highest version wins
                if accepted && best.as_ref().is_none_or(|b| version > *b) {
                    best = Some(version);
                }
            }
            if let Some(version) = best {
                previous = Some((version, commit.sha.clone()));
                return false;
            }
            commits.push(commit.clone());
            true
        })?;

        let (previous_version, previous_commit) = match &previous {
            Some((version, sha)) => (version.clone(), Some(sha.clone())),
            None => (Version::parse(scheme, &initial_version)?, None),
        };
        debug!(previous = %previous_version, commits = commits.len(), "release scope resolved");

        let mut significant: IndexMap<String, String> = IndexMap::new();
        let mut max_bump: Option<Bump> = None;
        for commit in &commits {
            if let Some(bump) = matcher::bump_for_message(&commit.message, &conventions)? {
                significant.insert(commit.sha.clone(), bump.to_string());
                if max_bump.as_ref().is_none_or(|current| bump > *current) {
                    max_bump = Some(bump);
                }
            }
        }

        let effective_bump = match &bump_override {
            Some(id) => Some(id.parse::<Bump>()?),
            None => max_bump,
        };

        let version = match &version_override {
            Some(overridden) => Version::parse(scheme, overridden)?,
            None => {
                let mut candidate = match &effective_bump {
                    Some(bump) => previous_version.bump(bump)?,
                    None => previous_version.clone(),
                };
                if release_type.collapsed_versioning && effective_bump.is_some() {
                    if let Some(template) = &release_type.collapsed_version_qualifier {
                        candidate = collapse(&candidate, template, state, &tag_versions)?;
                    }
                }
                candidate
            }
        };

        if let Some(range) = &version_range {
            if !range.is_match(&version.to_string()) {
                return Err(NyxError::VersionOutOfRange {
                    version: version.to_string(),
                    range: range.as_str().to_string(),
                });
            }
        }

        // a repository that was never released counts as a new version even
        // when the initial version is reused verbatim
        let new_version = version != previous_version || previous_commit.is_none();
        let new_release = new_version && release_type.publish;
        info!(version = %version, new_version, new_release, "version inferred");

        state.version = Some(version.to_string());
        state.bump = match &version_override {
            Some(_) => None,
            None => effective_bump.as_ref().map(ToString::to_string),
        };
        state.new_version = new_version;
        state.new_release = new_release;
        state.release_scope = ReleaseScope {
            previous_version: Some(previous_version.to_string()),
            previous_version_commit: previous_commit,
            initial_commit: commits.last().map(|c| c.sha.clone()),
            final_commit: commits.first().map(|c| c.sha.clone()),
            commits,
            significant_commits: significant,
        };

        if !dry_run {
            let latest = repository.latest_commit()?;
            let configuration = state.configuration();
            let configured_bump = configuration.get_bump().unwrap_or_default();
            let configured_version = configuration.get_version().unwrap_or_default();
            let configured_prefix = configuration.get_release_prefix();
            let configured_scheme = configuration.get_scheme().to_string();
            let version = state.version.clone().unwrap_or_default();
            state.put_internal(INTERNAL_LAST_COMMIT, &latest);
            state.put_internal(INTERNAL_BRANCH, &branch);
            state.put_internal(INTERNAL_CONFIGURED_BUMP, &configured_bump);
            state.put_internal(INTERNAL_CONFIGURED_VERSION, &configured_version);
            state.put_internal(INTERNAL_CONFIGURED_RELEASE_PREFIX, &configured_prefix);
            state.put_internal(INTERNAL_CONFIGURED_SCHEME, &configured_scheme);
            state.put_internal(INTERNAL_STATE_VERSION, &version);
        }

        Ok(())
    }
}

/// Applies collapsed versioning: the prerelease tail becomes
/// `<qualifier>.<N>` with `N` strictly above every tag already released
/// under the same qualifier for the same core version, and at least 1.
fn collapse(
    candidate: &Version,
    qualifier_template: &str,
    state: &State,
    tag_versions: &[Version],
) -> Result<Version> {
    let qualifier = nyx_template::render(qualifier_template, &state.to_context())?;
    if qualifier.trim().is_empty() {
        return Err(ConfigError::IllegalProperty {
            name: "releaseTypes.collapsedVersionQualifier".to_string(),
            reason: "the qualifier template rendered to an empty string".to_string(),
        }
        .into());
    }

    let core = candidate.core();
    let mut number = 1;
    for tag in tag_versions {
        if tag.core() == core {
            if let Some(existing) = tag.prerelease_number(&qualifier) {
                number = number.max(existing + 1);
            }
        }
    }
    Ok(core.with_prerelease(&qualifier, number)?)
}

fn parse_tag_version(name: &str, scheme: Scheme, prefix: &str, lenient: bool) -> Option<Version> {
    let candidate = if prefix.is_empty() {
        name
    } else {
        name.strip_prefix(prefix).unwrap_or(name)
    };
    Version::parse(scheme, candidate)
        .ok()
        .or_else(|| lenient.then(|| Version::parse_lenient(scheme, candidate).ok()).flatten())
}

/// The version filter for the selected release type: the configured range,
/// or one derived from the trailing version pattern of the branch name
/// (`release/1.2.x` accepts `1.2.*`).
fn resolve_version_range(branch: &str, release_type: &ReleaseType) -> Result<Option<Regex>> {
    if let Some(range) = &release_type.version_range {
        return compile_range(range).map(Some);
    }
    if !release_type.version_range_from_branch_name {
        return Ok(None);
    }

    let tail = branch.rsplit('/').next().unwrap_or(branch);
    let start = tail
        .char_indices()
        .find(|(_, c)| c.is_ascii_digit())
        .map(|(i, _)| i)
        .ok_or_else(|| ConfigError::IllegalProperty {
            name: "releaseTypes.versionRangeFromBranchName".to_string(),
            reason: format!("cannot derive a version range from branch '{branch}'"),
        })?;

    let mut pattern = String::from("^");
    for c in tail[start..].chars() {
        match c {
            'x' | 'X' | '*' => pattern.push_str(r"\d+"),
            '.' => pattern.push_str(r"\."),
            c if c.is_ascii_digit() || c == '-' => pattern.push(c),
            _ => break,
        }
    }
    pattern.push_str(".*$");
    compile_range(&pattern).map(Some)
}

fn compile_range(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        ConfigError::IllegalProperty {
            name: "releaseTypes.versionRange".to_string(),
            reason: format!("invalid regular expression: {e}"),
        }
        .into()
    })
}
