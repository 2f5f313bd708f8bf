use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use nyx_version::Scheme;

use crate::entities::{Asset, CommitMessageConvention, ItemsBlock, ReleaseType, ServiceConfig};

/// One source of configuration options. Every option is optional; absent
/// options fall through to the next layer in priority order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigurationLayer {
    pub assets: Option<IndexMap<String, Asset>>,
    pub bump: Option<String>,
    pub commit_message_conventions: Option<ItemsBlock<CommitMessageConvention>>,
    pub configuration_file: Option<String>,
    pub directory: Option<PathBuf>,
    pub dry_run: Option<bool>,
    pub initial_version: Option<String>,
    pub preset: Option<String>,
    pub release_lenient: Option<bool>,
    pub release_prefix: Option<String>,
    pub release_types: Option<ItemsBlock<ReleaseType>>,
    pub resume: Option<bool>,
    pub scheme: Option<Scheme>,
    pub services: Option<IndexMap<String, ServiceConfig>>,
    pub shared_configuration_file: Option<String>,
    pub state_file: Option<String>,
    pub verbosity: Option<String>,
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_layer_has_no_options() {
        let layer = ConfigurationLayer::default();
        assert!(layer.bump.is_none());
        assert!(layer.release_types.is_none());
    }

    #[test]
    fn layer_parses_from_json_with_camel_case_keys() {
        let json = r#"{
            "bump": "minor",
            "dryRun": true,
            "releasePrefix": "v",
            "stateFile": ".nyx-state.json"
        }"#;
        let layer: ConfigurationLayer = serde_json::from_str(json).expect("parse layer");
        assert_eq!(layer.bump.as_deref(), Some("minor"));
        assert_eq!(layer.dry_run, Some(true));
        assert_eq!(layer.release_prefix.as_deref(), Some("v"));
        assert_eq!(layer.state_file.as_deref(), Some(".nyx-state.json"));
    }

    #[test]
    fn layer_parses_composite_blocks_from_yaml() {
        let yaml = r"
commitMessageConventions:
  enabled:
    - conventionalCommits
  items:
    conventionalCommits:
      expression: '^(?P<type>\w+):.*$'
      bumpExpressions:
        minor: 'type=feat'
releaseTypes:
  enabled:
    - mainline
  items:
    mainline:
      branchFilter: '^main$'
      gitTag: true
";
        let layer: ConfigurationLayer = serde_yml::from_str(yaml).expect("parse layer");

        let conventions = layer.commit_message_conventions.expect("conventions block");
        assert_eq!(
            conventions.enabled,
            Some(vec!["conventionalCommits".to_string()])
        );
        assert!(conventions.items.contains_key("conventionalCommits"));

        let release_types = layer.release_types.expect("release types block");
        assert_eq!(release_types.items["mainline"].branch_filter, "^main$");
    }

    #[test]
    fn unknown_scheme_value_fails_to_parse() {
        let json = r#"{"scheme": "calver"}"#;
        let result: Result<ConfigurationLayer, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
