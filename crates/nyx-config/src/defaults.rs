use indexmap::IndexMap;

use nyx_version::Scheme;

use crate::entities::{ItemsBlock, ReleaseType};
use crate::layer::ConfigurationLayer;

/// The terminal configuration layer: every option a pipeline run relies on
/// has a value here. Held explicitly by the resolver so tests can substitute
/// their own.
#[must_use]
pub fn standard_defaults() -> ConfigurationLayer {
    ConfigurationLayer {
        bump: None,
        directory: Some(".".into()),
        dry_run: Some(false),
        initial_version: Some("0.1.0".to_string()),
        release_lenient: Some(true),
        release_prefix: Some(String::new()),
        release_types: Some(ItemsBlock {
            enabled: Some(vec!["mainline".to_string(), "internal".to_string()]),
            items: IndexMap::from([
                ("mainline".to_string(), ReleaseType::mainline()),
                ("internal".to_string(), ReleaseType::internal()),
            ]),
        }),
        resume: Some(false),
        scheme: Some(Scheme::Semver),
        ..ConfigurationLayer::default()
    }
}
