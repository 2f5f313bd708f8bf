use tracing::{debug, info};

use nyx_config::{ConfigError, FileError};
use nyx_git::Repository;

use crate::services::ServiceRegistry;
use crate::state::State;
use crate::Result;

use super::Command;

/// Removes the generated artifacts (the state file) and resets the run
/// state. Clean is never cached and never considered up to date.
pub(crate) struct Clean;

impl Command for Clean {
    fn name(&self) -> &'static str {
        "Clean"
    }

    fn is_up_to_date(&self, _state: &State, _repository: &Repository) -> Result<bool> {
        Ok(false)
    }

    fn run(
        &self,
        state: &mut State,
        _repository: &Repository,
        _services: &ServiceRegistry,
    ) -> Result<()> {
        debug!("running the Clean command");

        let configuration = state.configuration();
        let dry_run = configuration.get_dry_run();

        if let Some(path) = super::state_file_path(configuration) {
            if path.is_file() {
                if dry_run {
                    info!(path = %path.display(), "state file removal skipped due to dry run");
                } else {
                    std::fs::remove_file(&path).map_err(|source| ConfigError::DataAccess {
                        path: path.clone(),
                        source: FileError::Io(source),
                    })?;
                    debug!(path = %path.display(), "state file removed");
                }
            }
        }

        state.reset();
        Ok(())
    }
}
