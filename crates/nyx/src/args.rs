use std::path::PathBuf;

use clap::{Parser, Subcommand};

use nyx_config::ConfigurationLayer;
use nyx_version::Scheme;

#[derive(Parser)]
#[command(name = "nyx")]
#[command(about = "Semantic release automation driven by the Git history", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: PipelineCommand,

    /// Working directory holding the Git repository
    #[arg(short, long, global = true)]
    pub(crate) directory: Option<PathBuf>,

    /// Compute everything but skip all side effects
    #[arg(long, global = true)]
    pub(crate) dry_run: bool,

    /// Resume from the saved state file
    #[arg(long, global = true)]
    pub(crate) resume: bool,

    /// Pin the bump identifier instead of inferring it
    #[arg(long, global = true)]
    pub(crate) bump: Option<String>,

    /// Versioning scheme (semver or maven)
    #[arg(long, global = true)]
    pub(crate) scheme: Option<Scheme>,

    /// Prefix prepended to release tags
    #[arg(long, global = true)]
    pub(crate) release_prefix: Option<String>,

    /// Tolerate arbitrary prefixes when parsing tags
    #[arg(long, global = true)]
    pub(crate) release_lenient: Option<bool>,

    /// Where to persist the run state
    #[arg(long, global = true)]
    pub(crate) state_file: Option<String>,

    /// Custom configuration file
    #[arg(long, global = true)]
    pub(crate) configuration_file: Option<String>,

    /// Custom shared configuration file
    #[arg(long, global = true)]
    pub(crate) shared_configuration_file: Option<String>,

    /// Named preset providing conventions and release types
    #[arg(long, global = true)]
    pub(crate) preset: Option<String>,

    /// Version used when the repository has no release tags yet
    #[arg(long, global = true)]
    pub(crate) initial_version: Option<String>,

    /// Release exactly this version instead of inferring one
    #[arg(long = "version-override", global = true)]
    pub(crate) version_override: Option<String>,

    /// Log filter (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub(crate) verbosity: Option<String>,
}

/// Sub-commands map one to one onto the pipeline commands.
#[derive(Subcommand, Clone, Copy)]
pub(crate) enum PipelineCommand {
    /// Remove generated artifacts and reset the run state
    Clean,
    /// Stage the configured asset definitions
    Arrange,
    /// Infer the next version from the commit history
    Infer,
    /// Build the configured release assets
    Make,
    /// Commit, tag and push the release
    Mark,
    /// Publish the release to the configured services
    Publish,
}

impl Cli {
    /// The command-line configuration layer; only options the user actually
    /// passed are set, everything else falls through to the lower layers.
    pub(crate) fn to_configuration_layer(&self) -> ConfigurationLayer {
        ConfigurationLayer {
            bump: self.bump.clone(),
            configuration_file: self.configuration_file.clone(),
            directory: self.directory.clone(),
            dry_run: self.dry_run.then_some(true),
            initial_version: self.initial_version.clone(),
            preset: self.preset.clone(),
            release_lenient: self.release_lenient,
            release_prefix: self.release_prefix.clone(),
            resume: self.resume.then_some(true),
            scheme: self.scheme,
            shared_configuration_file: self.shared_configuration_file.clone(),
            state_file: self.state_file.clone(),
            verbosity: self.verbosity.clone(),
            version: self.version_override.clone(),
            ..ConfigurationLayer::default()
        }
    }
}
