use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::path::PathBuf;

use indexmap::IndexMap;
use tracing::{debug, error, trace};

use nyx_version::Scheme;

use crate::entities::{Asset, CommitMessageConvention, ItemsBlock, ReleaseType, ServiceConfig};
use crate::error::ConfigError;
use crate::layer::ConfigurationLayer;
use crate::presets::preset_by_name;
use crate::{file_mapper, Result};

const STANDARD_LOCAL_FILES: &[&str] = &[".nyx.json", ".nyx.yaml", ".nyx.yml"];
const STANDARD_SHARED_FILES: &[&str] = &[".nyx-shared.json", ".nyx-shared.yaml", ".nyx-shared.yml"];

/// The priority of a configuration layer; lower values win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerPriority {
    CommandLine,
    Plugin,
    CustomLocalFile,
    CustomSharedFile,
    StandardLocalFile,
    StandardSharedFile,
    Preset,
    Default,
}

/// The layered configuration. Each option resolves to the first layer, in
/// priority order, that defines it; the defaults layer terminates every
/// lookup.
///
/// The derived layers (custom files, preset) are re-materialized whenever a
/// mutator changes the options that name them, and the composite blocks are
/// cached until then.
pub struct Configuration {
    layers: BTreeMap<LayerPriority, ConfigurationLayer>,
    conventions_cache: OnceCell<Vec<(String, CommitMessageConvention)>>,
    release_types_cache: OnceCell<Vec<(String, ReleaseType)>>,
}

impl Configuration {
    /// Creates a configuration seeded with `defaults` as the terminal layer
    /// and loads any standard configuration files found in the directory.
    ///
    /// # Errors
    ///
    /// Returns an error when a discovered configuration file cannot be read
    /// or parsed.
    pub fn new(defaults: ConfigurationLayer) -> Result<Self> {
        debug!("new configuration object");
        let mut configuration = Self {
            layers: BTreeMap::from([(LayerPriority::Default, defaults)]),
            conventions_cache: OnceCell::new(),
            release_types_cache: OnceCell::new(),
        };
        configuration.update_configured_layers()?;
        Ok(configuration)
    }

    /// Adds, replaces or removes the command-line layer.
    ///
    /// # Errors
    ///
    /// Returns an error when a configuration file named by the new layer
    /// cannot be read or parsed.
    pub fn with_command_line_layer(mut self, layer: Option<ConfigurationLayer>) -> Result<Self> {
        self.set_layer(LayerPriority::CommandLine, layer)?;
        Ok(self)
    }

    /// Adds, replaces or removes the plugin layer.
    ///
    /// # Errors
    ///
    /// Returns an error when a configuration file named by the new layer
    /// cannot be read or parsed.
    pub fn with_plugin_layer(mut self, layer: Option<ConfigurationLayer>) -> Result<Self> {
        self.set_layer(LayerPriority::Plugin, layer)?;
        Ok(self)
    }

    fn set_layer(&mut self, priority: LayerPriority, layer: Option<ConfigurationLayer>) -> Result<()> {
        match layer {
            Some(layer) => {
                debug!(?priority, "adding or replacing configuration layer");
                self.layers.insert(priority, layer);
            }
            None => {
                debug!(?priority, "removing configuration layer");
                self.layers.remove(&priority);
            }
        }
        self.update_configured_layers()
    }

    fn first<T>(
        &self,
        skip: Option<LayerPriority>,
        pick: impl Fn(&ConfigurationLayer) -> Option<T>,
    ) -> Option<T> {
        self.layers
            .iter()
            .filter(|(priority, _)| Some(**priority) != skip)
            .find_map(|(_, layer)| pick(layer))
    }

    pub fn get_bump(&self) -> Option<String> {
        trace!("retrieving the bump configuration option");
        self.first(None, |l| l.bump.clone())
    }

    pub fn get_directory(&self) -> PathBuf {
        self.first(None, |l| l.directory.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn get_dry_run(&self) -> bool {
        self.first(None, |l| l.dry_run).unwrap_or(false)
    }

    pub fn get_initial_version(&self) -> String {
        self.first(None, |l| l.initial_version.clone())
            .unwrap_or_else(|| "0.1.0".to_string())
    }

    /// The configured preset name. The preset layer itself is skipped, a
    /// preset cannot name another preset.
    pub fn get_preset(&self) -> Option<String> {
        self.first(Some(LayerPriority::Preset), |l| l.preset.clone())
    }

    /// The custom configuration file path. The layer loaded from that file
    /// is skipped, the option cannot redefine itself.
    pub fn get_configuration_file(&self) -> Option<String> {
        self.first(Some(LayerPriority::CustomLocalFile), |l| {
            l.configuration_file.clone()
        })
    }

    /// The custom shared configuration file path, with the same
    /// self-reference rule as [`Self::get_configuration_file`].
    pub fn get_shared_configuration_file(&self) -> Option<String> {
        self.first(Some(LayerPriority::CustomSharedFile), |l| {
            l.shared_configuration_file.clone()
        })
    }

    pub fn get_release_lenient(&self) -> bool {
        self.first(None, |l| l.release_lenient).unwrap_or(true)
    }

    pub fn get_release_prefix(&self) -> String {
        self.first(None, |l| l.release_prefix.clone())
            .unwrap_or_default()
    }

    pub fn get_resume(&self) -> bool {
        self.first(None, |l| l.resume).unwrap_or(false)
    }

    pub fn get_scheme(&self) -> Scheme {
        self.first(None, |l| l.scheme).unwrap_or_default()
    }

    pub fn get_state_file(&self) -> Option<String> {
        self.first(None, |l| l.state_file.clone())
    }

    pub fn get_verbosity(&self) -> Option<String> {
        self.first(None, |l| l.verbosity.clone())
    }

    /// The version override; when set it supersedes inference.
    pub fn get_version(&self) -> Option<String> {
        self.first(None, |l| l.version.clone())
    }

    pub fn get_assets(&self) -> IndexMap<String, Asset> {
        self.first(None, |l| l.assets.clone()).unwrap_or_default()
    }

    pub fn get_services(&self) -> IndexMap<String, ServiceConfig> {
        self.first(None, |l| l.services.clone()).unwrap_or_default()
    }

    /// The enabled commit message conventions, in evaluation order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IllegalProperty`] when an enabled name has no
    /// definition in any layer.
    pub fn get_commit_message_conventions(
        &self,
    ) -> Result<Vec<(String, CommitMessageConvention)>> {
        if let Some(cached) = self.conventions_cache.get() {
            return Ok(cached.clone());
        }
        let resolved =
            self.resolve_block("commitMessageConventions", |l| {
                l.commit_message_conventions.as_ref()
            })?;
        let _ = self.conventions_cache.set(resolved.clone());
        Ok(resolved)
    }

    /// The enabled release types, in evaluation order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IllegalProperty`] when an enabled name has no
    /// definition in any layer.
    pub fn get_release_types(&self) -> Result<Vec<(String, ReleaseType)>> {
        if let Some(cached) = self.release_types_cache.get() {
            return Ok(cached.clone());
        }
        let resolved = self.resolve_block("releaseTypes", |l| l.release_types.as_ref())?;
        let _ = self.release_types_cache.set(resolved.clone());
        Ok(resolved)
    }

    fn resolve_block<T: Clone>(
        &self,
        name: &str,
        block: impl Fn(&ConfigurationLayer) -> Option<&ItemsBlock<T>>,
    ) -> Result<Vec<(String, T)>> {
        let enabled = self
            .layers
            .values()
            .find_map(|layer| block(layer).and_then(|b| b.enabled.clone()))
            .unwrap_or_default();

        let mut resolved = Vec::with_capacity(enabled.len());
        for item_name in enabled {
            let item = self
                .layers
                .values()
                .find_map(|layer| block(layer).and_then(|b| b.items.get(&item_name).cloned()));
            match item {
                Some(item) => resolved.push((item_name, item)),
                None => {
                    return Err(ConfigError::illegal(
                        &format!("{name}.enabled"),
                        format!("enabled item '{item_name}' is not defined in any layer"),
                    ))
                }
            }
        }
        Ok(resolved)
    }

    fn absolute_path(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            path
        } else {
            self.get_directory().join(path)
        }
    }

    /// Re-materializes the derived layers (standard files, custom files,
    /// preset) after any change to the options that name them, and drops the
    /// composite block caches.
    fn update_configured_layers(&mut self) -> Result<()> {
        // standard files are searched at their well-known locations; a
        // missing file just leaves the layer out
        for (priority, names) in [
            (LayerPriority::StandardLocalFile, STANDARD_LOCAL_FILES),
            (LayerPriority::StandardSharedFile, STANDARD_SHARED_FILES),
        ] {
            self.layers.remove(&priority);
            for name in names {
                let path = self.absolute_path(name);
                if path.is_file() {
                    debug!(path = %path.display(), "loading standard configuration file");
                    let layer = file_mapper::load(&path).map_err(|source| {
                        ConfigError::DataAccess {
                            path: path.clone(),
                            source,
                        }
                    })?;
                    self.layers.insert(priority, layer);
                    break;
                }
            }
        }

        // custom files are configured by higher layers and must exist
        for (priority, configured) in [
            (
                LayerPriority::CustomLocalFile,
                self.get_configuration_file(),
            ),
            (
                LayerPriority::CustomSharedFile,
                self.get_shared_configuration_file(),
            ),
        ] {
            match configured {
                None => {
                    self.layers.remove(&priority);
                }
                Some(path) if path.trim().is_empty() => {
                    error!(?priority, "an empty configuration file path has been defined and will be ignored");
                    self.layers.remove(&priority);
                }
                Some(path) => {
                    let path = self.absolute_path(&path);
                    debug!(path = %path.display(), "loading custom configuration file");
                    let layer = file_mapper::load(&path).map_err(|source| {
                        ConfigError::DataAccess {
                            path: path.clone(),
                            source,
                        }
                    })?;
                    self.layers.insert(priority, layer);
                }
            }
        }

        match self.get_preset() {
            None => {
                self.layers.remove(&LayerPriority::Preset);
            }
            Some(name) if name.trim().is_empty() => {
                error!("an empty preset name has been defined and will be ignored");
                self.layers.remove(&LayerPriority::Preset);
            }
            Some(name) => {
                debug!(preset = %name, "loading preset configuration");
                let layer = preset_by_name(&name)?;
                self.layers.insert(LayerPriority::Preset, layer);
            }
        }

        trace!("clearing the configuration cache");
        self.conventions_cache = OnceCell::new();
        self.release_types_cache = OnceCell::new();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standard_defaults;

    fn layer_with_bump(bump: &str) -> ConfigurationLayer {
        ConfigurationLayer {
            bump: Some(bump.to_string()),
            ..ConfigurationLayer::default()
        }
    }

    #[test]
    fn defaults_terminate_every_lookup() -> anyhow::Result<()> {
        let configuration = Configuration::new(standard_defaults())?;

        assert_eq!(configuration.get_scheme(), Scheme::Semver);
        assert_eq!(configuration.get_initial_version(), "0.1.0");
        assert!(!configuration.get_dry_run());
        assert!(configuration.get_bump().is_none());
        Ok(())
    }

    #[test]
    fn command_line_wins_over_plugin_and_defaults() -> anyhow::Result<()> {
        let configuration = Configuration::new(standard_defaults())?
            .with_plugin_layer(Some(layer_with_bump("minor")))?
            .with_command_line_layer(Some(layer_with_bump("major")))?;

        assert_eq!(configuration.get_bump().as_deref(), Some("major"));
        Ok(())
    }

    #[test]
    fn plugin_layer_fills_gaps_left_by_command_line() -> anyhow::Result<()> {
        let command_line = ConfigurationLayer {
            dry_run: Some(true),
            ..ConfigurationLayer::default()
        };
        let configuration = Configuration::new(standard_defaults())?
            .with_plugin_layer(Some(layer_with_bump("patch")))?
            .with_command_line_layer(Some(command_line))?;

        assert!(configuration.get_dry_run());
        assert_eq!(configuration.get_bump().as_deref(), Some("patch"));
        Ok(())
    }

    #[test]
    fn removing_a_layer_restores_the_lower_value() -> anyhow::Result<()> {
        let configuration = Configuration::new(standard_defaults())?
            .with_command_line_layer(Some(layer_with_bump("major")))?
            .with_command_line_layer(None)?;

        assert!(configuration.get_bump().is_none());
        Ok(())
    }

    #[test]
    fn resolution_is_idempotent() -> anyhow::Result<()> {
        let configuration = Configuration::new(standard_defaults())?
            .with_command_line_layer(Some(layer_with_bump("minor")))?;

        assert_eq!(configuration.get_bump(), configuration.get_bump());
        assert_eq!(
            configuration.get_release_types()?,
            configuration.get_release_types()?
        );
        Ok(())
    }

    #[test]
    fn standard_local_file_is_discovered_in_the_directory() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join(".nyx.json"), r#"{"bump": "patch"}"#)?;

        let defaults = ConfigurationLayer {
            directory: Some(dir.path().to_path_buf()),
            ..standard_defaults()
        };
        let configuration = Configuration::new(defaults)?;

        assert_eq!(configuration.get_bump().as_deref(), Some("patch"));
        Ok(())
    }

    #[test]
    fn json_takes_precedence_in_the_standard_search_order() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join(".nyx.json"), r#"{"bump": "major"}"#)?;
        std::fs::write(dir.path().join(".nyx.yaml"), "bump: patch\n")?;

        let defaults = ConfigurationLayer {
            directory: Some(dir.path().to_path_buf()),
            ..standard_defaults()
        };
        let configuration = Configuration::new(defaults)?;

        assert_eq!(configuration.get_bump().as_deref(), Some("major"));
        Ok(())
    }

    #[test]
    fn local_file_wins_over_shared_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join(".nyx.yaml"), "releasePrefix: v\n")?;
        std::fs::write(
            dir.path().join(".nyx-shared.yaml"),
            "releasePrefix: rel-\nbump: minor\n",
        )?;

        let defaults = ConfigurationLayer {
            directory: Some(dir.path().to_path_buf()),
            ..standard_defaults()
        };
        let configuration = Configuration::new(defaults)?;

        assert_eq!(configuration.get_release_prefix(), "v");
        assert_eq!(configuration.get_bump().as_deref(), Some("minor"));
        Ok(())
    }

    #[test]
    fn custom_configuration_file_is_loaded_from_a_relative_path() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("custom.yaml"), "bump: minor\n")?;

        let command_line = ConfigurationLayer {
            configuration_file: Some("custom.yaml".to_string()),
            ..ConfigurationLayer::default()
        };
        let defaults = ConfigurationLayer {
            directory: Some(dir.path().to_path_buf()),
            ..standard_defaults()
        };
        let configuration =
            Configuration::new(defaults)?.with_command_line_layer(Some(command_line))?;

        assert_eq!(configuration.get_bump().as_deref(), Some("minor"));
        Ok(())
    }

    #[test]
    fn configuration_file_cannot_name_itself() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        // the custom file tries to redefine configurationFile; the
        // self-reference is skipped so the recursion never happens
        std::fs::write(
            dir.path().join("custom.yaml"),
            "configurationFile: other.yaml\nbump: minor\n",
        )?;

        let command_line = ConfigurationLayer {
            configuration_file: Some("custom.yaml".to_string()),
            ..ConfigurationLayer::default()
        };
        let defaults = ConfigurationLayer {
            directory: Some(dir.path().to_path_buf()),
            ..standard_defaults()
        };
        let configuration =
            Configuration::new(defaults)?.with_command_line_layer(Some(command_line))?;

        assert_eq!(
            configuration.get_configuration_file().as_deref(),
            Some("custom.yaml")
        );
        assert_eq!(configuration.get_bump().as_deref(), Some("minor"));
        Ok(())
    }

    #[test]
    fn blank_configuration_file_path_is_ignored() -> anyhow::Result<()> {
        let command_line = ConfigurationLayer {
            configuration_file: Some("  ".to_string()),
            ..ConfigurationLayer::default()
        };
        let configuration = Configuration::new(standard_defaults())?
            .with_command_line_layer(Some(command_line))?;

        assert!(configuration.get_bump().is_none());
        Ok(())
    }

    #[test]
    fn missing_custom_configuration_file_is_a_data_access_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let command_line = ConfigurationLayer {
            configuration_file: Some("missing.yaml".to_string()),
            ..ConfigurationLayer::default()
        };
        let defaults = ConfigurationLayer {
            directory: Some(dir.path().to_path_buf()),
            ..standard_defaults()
        };
        let result = Configuration::new(defaults)?.with_command_line_layer(Some(command_line));

        assert!(matches!(result, Err(ConfigError::DataAccess { .. })));
        Ok(())
    }

    #[test]
    fn preset_layer_is_materialized_by_name() -> anyhow::Result<()> {
        let command_line = ConfigurationLayer {
            preset: Some("simple".to_string()),
            ..ConfigurationLayer::default()
        };
        let configuration = Configuration::new(standard_defaults())?
            .with_command_line_layer(Some(command_line))?;

        let conventions = configuration.get_commit_message_conventions()?;
        assert_eq!(conventions.len(), 1);
        assert_eq!(conventions[0].0, "conventionalCommits");
        Ok(())
    }

    #[test]
    fn unknown_preset_fails_resolution() -> anyhow::Result<()> {
        let command_line = ConfigurationLayer {
            preset: Some("enterprise".to_string()),
            ..ConfigurationLayer::default()
        };
        let result =
            Configuration::new(standard_defaults())?.with_command_line_layer(Some(command_line));

        assert!(matches!(result, Err(ConfigError::IllegalProperty { .. })));
        Ok(())
    }

    #[test]
    fn enabled_item_defined_in_a_lower_layer_resolves() -> anyhow::Result<()> {
        use indexmap::IndexMap;

        // the command line enables a release type that only the defaults
        // layer defines
        let command_line = ConfigurationLayer {
            release_types: Some(ItemsBlock {
                enabled: Some(vec!["internal".to_string()]),
                items: IndexMap::new(),
            }),
            ..ConfigurationLayer::default()
        };
        let configuration = Configuration::new(standard_defaults())?
            .with_command_line_layer(Some(command_line))?;

        let release_types = configuration.get_release_types()?;
        assert_eq!(release_types.len(), 1);
        assert_eq!(release_types[0].0, "internal");
        assert!(release_types[0].1.collapsed_versioning);
        Ok(())
    }

    #[test]
    fn enabled_item_without_definition_is_an_illegal_property() -> anyhow::Result<()> {
        use indexmap::IndexMap;

        let command_line = ConfigurationLayer {
            release_types: Some(ItemsBlock {
                enabled: Some(vec!["nightly".to_string()]),
                items: IndexMap::new(),
            }),
            ..ConfigurationLayer::default()
        };
        let result = Configuration::new(standard_defaults())?
            .with_command_line_layer(Some(command_line));

        match result {
            Ok(configuration) => {
                assert!(matches!(
                    configuration.get_release_types(),
                    Err(ConfigError::IllegalProperty { .. })
                ));
            }
            Err(_) => panic!("layer mutation itself should succeed"),
        }
        Ok(())
    }

    #[test]
    fn item_lookup_prefers_the_higher_layer_definition() -> anyhow::Result<()> {
        use indexmap::IndexMap;

        let command_line = ConfigurationLayer {
            release_types: Some(ItemsBlock {
                enabled: Some(vec!["mainline".to_string()]),
                items: IndexMap::from([(
                    "mainline".to_string(),
                    ReleaseType {
                        branch_filter: "^trunk$".to_string(),
                        ..ReleaseType::mainline()
                    },
                )]),
            }),
            ..ConfigurationLayer::default()
        };
        let configuration = Configuration::new(standard_defaults())?
            .with_command_line_layer(Some(command_line))?;

        let release_types = configuration.get_release_types()?;
        assert_eq!(release_types[0].1.branch_filter, "^trunk$");
        Ok(())
    }
}
