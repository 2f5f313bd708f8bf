mod arrange;
mod clean;
mod infer;
mod make;
mod mark;
mod publish;

use std::path::PathBuf;

use nyx_config::{ConfigError, Configuration, ReleaseType};
use nyx_git::Repository;

use crate::services::ServiceRegistry;
use crate::state::State;
use crate::Result;

/// The state file location, resolved against the configured directory.
pub(crate) fn state_file_path(configuration: &Configuration) -> Option<PathBuf> {
    configuration.get_state_file().map(|file| {
        let path = PathBuf::from(&file);
        if path.is_absolute() {
            path
        } else {
            configuration.get_directory().join(path)
        }
    })
}

/// The release type Infer selected for this run.
pub(crate) fn resolve_release_type(state: &State) -> Result<ReleaseType> {
    let name = state.release_type.as_deref().ok_or_else(|| {
        ConfigError::IllegalProperty {
            name: "releaseTypes".to_string(),
            reason: "no release type has been selected for this run".to_string(),
        }
    })?;
    state
        .configuration()
        .get_release_types()?
        .into_iter()
        .find(|(candidate, _)| candidate == name)
        .map(|(_, release_type)| release_type)
        .ok_or_else(|| {
            ConfigError::IllegalProperty {
                name: format!("releaseTypes.{name}"),
                reason: "the selected release type is no longer configured".to_string(),
            }
            .into()
        })
}

/// One step of the release pipeline. Commands are stateless; everything they
/// compute lands in the shared [`State`], and the attributes backing their
/// up-to-date checks live in the state internals.
pub trait Command {
    fn name(&self) -> &'static str;

    /// Whether re-running the command on the current inputs would produce
    /// the outputs already recorded in the state.
    ///
    /// # Errors
    ///
    /// Returns an error when the check cannot read the repository.
    fn is_up_to_date(&self, state: &State, repository: &Repository) -> Result<bool>;

    /// # Errors
    ///
    /// Returns an error when the command cannot complete; partial progress
    /// is recorded in the state before the error surfaces.
    fn run(
        &self,
        state: &mut State,
        repository: &Repository,
        services: &ServiceRegistry,
    ) -> Result<()>;
}

/// The commands of the pipeline, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Clean,
    Arrange,
    Infer,
    Make,
    Mark,
    Publish,
}

impl CommandKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Clean => "Clean",
            Self::Arrange => "Arrange",
            Self::Infer => "Infer",
            Self::Make => "Make",
            Self::Mark => "Mark",
            Self::Publish => "Publish",
        }
    }

    /// The command that must have run before this one, if any.
    #[must_use]
    pub fn prerequisite(self) -> Option<Self> {
        match self {
            Self::Clean | Self::Arrange => None,
            Self::Infer => Some(Self::Arrange),
            Self::Make => Some(Self::Infer),
            Self::Mark => Some(Self::Make),
            Self::Publish => Some(Self::Mark),
        }
    }

    pub(crate) fn instantiate(self) -> Box<dyn Command> {
        match self {
            Self::Clean => Box::new(clean::Clean),
            Self::Arrange => Box::new(arrange::Arrange),
            Self::Infer => Box::new(infer::Infer),
            Self::Make => Box::new(make::Make),
            Self::Mark => Box::new(mark::Mark),
            Self::Publish => Box::new(publish::Publish),
        }
    }
}
