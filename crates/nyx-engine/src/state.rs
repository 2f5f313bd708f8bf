use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use nyx_config::{file_mapper, ConfigError, Configuration};
use nyx_git::Commit;
use nyx_version::{Scheme, Version};

use crate::Result;

/// The window of commits a release covers, plus the versions bounding it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReleaseScope {
    /// The most recent version tag matching the release type, if any.
    pub previous_version: Option<String>,
    /// The commit the previous version tag points to.
    pub previous_version_commit: Option<String>,
    /// The oldest commit in scope; the root commit when the repository has
    /// never been released.
    pub initial_commit: Option<String>,
    /// The newest commit in scope; rewritten by Mark when it commits.
    pub final_commit: Option<String>,
    /// Commits in scope, newest first.
    pub commits: Vec<Commit>,
    /// SHA to bump identifier, for the commits whose convention produced one.
    pub significant_commits: IndexMap<String, String>,
}

impl ReleaseScope {
    #[must_use]
    pub fn significant(&self) -> bool {
        !self.significant_commits.is_empty()
    }
}

/// An asset definition after its templates have been rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolvedAsset {
    pub path: String,
    pub service: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StateDocument {
    timestamp: Option<i64>,
    scheme: Scheme,
    branch: Option<String>,
    bump: Option<String>,
    version: Option<String>,
    new_version: bool,
    new_release: bool,
    release_type: Option<String>,
    release_scope: ReleaseScope,
    assets: IndexMap<String, ResolvedAsset>,
    internals: BTreeMap<String, String>,
}

/// The mutable state of a pipeline run. Created at pipeline start, filled in
/// by the commands, persisted to the state file after each of them.
pub struct State {
    configuration: Configuration,
    timestamp: OnceCell<i64>,
    scheme: Scheme,
    pub branch: Option<String>,
    pub bump: Option<String>,
    pub version: Option<String>,
    pub new_version: bool,
    pub new_release: bool,
    /// Name of the release type selected by Infer.
    pub release_type: Option<String>,
    pub release_scope: ReleaseScope,
    /// Asset definitions resolved by Arrange.
    pub assets: IndexMap<String, ResolvedAsset>,
    /// Opaque per-command attributes backing the up-to-date checks. Keys
    /// follow the `<Command>.<purpose>` convention.
    pub internals: BTreeMap<String, String>,
}

impl State {
    #[must_use]
    pub fn new(configuration: Configuration) -> Self {
        let scheme = configuration.get_scheme();
        Self {
            configuration,
            timestamp: OnceCell::new(),
            scheme,
            branch: None,
            bump: None,
            version: None,
            new_version: false,
            new_release: false,
            release_type: None,
            release_scope: ReleaseScope::default(),
            assets: IndexMap::new(),
            internals: BTreeMap::new(),
        }
    }

    /// Loads a previously saved state over a fresh one; the configuration
    /// layers are never overridden by the file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DataAccess`] when the file cannot be read or
    /// does not parse.
    pub fn load(path: &Path, configuration: Configuration) -> Result<Self> {
        let document: StateDocument =
            file_mapper::load(path).map_err(|source| ConfigError::DataAccess {
                path: path.to_path_buf(),
                source,
            })?;

        let mut state = Self::new(configuration);
        if let Some(timestamp) = document.timestamp {
            let _ = state.timestamp.set(timestamp);
        }
        state.scheme = document.scheme;
        state.branch = document.branch;
        state.bump = document.bump;
        state.version = document.version;
        state.new_version = document.new_version;
        state.new_release = document.new_release;
        state.release_type = document.release_type;
        state.release_scope = document.release_scope;
        state.assets = document.assets;
        state.internals = document.internals;
        Ok(state)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::DataAccess`] when the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let document = self.document();
        file_mapper::save(path, &document).map_err(|source| ConfigError::DataAccess {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    fn document(&self) -> StateDocument {
        StateDocument {
            timestamp: self.timestamp.get().copied(),
            scheme: self.scheme,
            branch: self.branch.clone(),
            bump: self.bump.clone(),
            version: self.version.clone(),
            new_version: self.new_version,
            new_release: self.new_release,
            release_type: self.release_type.clone(),
            release_scope: self.release_scope.clone(),
            assets: self.assets.clone(),
            internals: self.internals.clone(),
        }
    }

    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    #[must_use]
    pub fn into_configuration(self) -> Configuration {
        self.configuration
    }

    /// The run timestamp in epoch milliseconds, frozen at first read.
    pub fn timestamp(&self) -> i64 {
        *self
            .timestamp
            .get_or_init(|| chrono::Utc::now().timestamp_millis())
    }

    #[must_use]
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// The computed version as a typed value.
    ///
    /// # Errors
    ///
    /// Returns an error when the stored version does not parse under the
    /// resolved scheme.
    pub fn version_parsed(&self) -> Result<Option<Version>> {
        match &self.version {
            Some(version) => Ok(Some(Version::parse(self.scheme, version)?)),
            None => Ok(None),
        }
    }

    /// Drops everything a previous run computed, keeping the configuration.
    pub fn reset(&mut self) {
        self.timestamp = OnceCell::new();
        self.branch = None;
        self.bump = None;
        self.version = None;
        self.new_version = false;
        self.new_release = false;
        self.release_type = None;
        self.release_scope = ReleaseScope::default();
        self.assets = IndexMap::new();
        self.internals = BTreeMap::new();
    }

    pub fn put_internal(&mut self, key: &str, value: &str) {
        self.internals.insert(key.to_string(), value.to_string());
    }

    /// Whether a stored internal attribute equals the live value.
    #[must_use]
    pub fn internal_matches(&self, key: &str, value: &str) -> bool {
        self.internals.get(key).is_some_and(|stored| stored == value)
    }

    /// The JSON projection templates are rendered against.
    #[must_use]
    pub fn to_context(&self) -> Value {
        json!({
            "timestamp": self.timestamp(),
            "scheme": self.scheme.to_string(),
            "branch": self.branch,
            "bump": self.bump,
            "version": self.version,
            "newVersion": self.new_version,
            "newRelease": self.new_release,
            "releaseType": self.release_type,
            "releaseScope": serde_json::to_value(&self.release_scope).unwrap_or(Value::Null),
            "configuration": {
                "releasePrefix": self.configuration.get_release_prefix(),
                "initialVersion": self.configuration.get_initial_version(),
                "dryRun": self.configuration.get_dry_run(),
            },
        })
    }
}
