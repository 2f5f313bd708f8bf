use indexmap::IndexMap;

use crate::entities::{CommitMessageConvention, ItemsBlock, ReleaseType};
use crate::error::ConfigError;
use crate::layer::ConfigurationLayer;

/// Resolves a named preset into a configuration layer.
///
/// # Errors
///
/// Returns [`ConfigError::IllegalProperty`] when the name does not match a
/// shipped preset.
pub fn preset_by_name(name: &str) -> Result<ConfigurationLayer, ConfigError> {
    match name {
        "simple" => Ok(simple()),
        _ => Err(ConfigError::illegal(
            "preset",
            format!("no preset named '{name}'"),
        )),
    }
}

/// The `simple` preset: the Conventional Commits convention plus the
/// mainline/internal release type pair.
fn simple() -> ConfigurationLayer {
    ConfigurationLayer {
        commit_message_conventions: Some(ItemsBlock {
            enabled: Some(vec!["conventionalCommits".to_string()]),
            items: IndexMap::from([(
                "conventionalCommits".to_string(),
                CommitMessageConvention::conventional_commits(),
            )]),
        }),
        release_types: Some(ItemsBlock {
            enabled: Some(vec!["mainline".to_string(), "internal".to_string()]),
            items: IndexMap::from([
                ("mainline".to_string(), ReleaseType::mainline()),
                ("internal".to_string(), ReleaseType::internal()),
            ]),
        }),
        ..ConfigurationLayer::default()
    }
}
