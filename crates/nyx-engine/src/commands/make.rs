use std::path::Path;

use tracing::{debug, info};

use nyx_config::ConfigError;
use nyx_git::Repository;

use crate::services::ServiceRegistry;
use crate::state::State;
use crate::{NyxError, Result};

use super::Command;

const INTERNAL_LAST_COMMIT: &str = "Make.last.commit";
const STATE_VERSION: &str = "Make.state.version";

/// Renders the staged asset paths against the inferred state and builds each
/// asset through its asset service.
pub(crate) struct Make;

impl Command for Make {
    fn name(&self) -> &'static str {
        "Make"
    }

    fn is_up_to_date(&self, state: &State, repository: &Repository) -> Result<bool> {
        let Some(version) = state.version.as_deref() else {
            return Ok(false);
        };
        let Ok(latest) = repository.latest_commit() else {
            return Ok(false);
        };
        Ok(state.internal_matches(INTERNAL_LAST_COMMIT, &latest)
            && state.internal_matches(STATE_VERSION, version))
    }

    fn run(
        &self,
        state: &mut State,
        repository: &Repository,
        services: &ServiceRegistry,
    ) -> Result<()> {
        debug!("running the Make command");

        let dry_run = state.configuration().get_dry_run();
        let context = state.to_context();
        let mut assets = state.assets.clone();

        for (name, asset) in &mut assets {
            let path = nyx_template::render(&asset.path, &context)?;
            asset.path = path.clone();

            let Some(service_name) = &asset.service else {
                debug!(asset = %name, "asset has no service, skipping");
                continue;
            };
            let Some(service) = services.asset_service(service_name) else {
                return Err(ConfigError::IllegalProperty {
                    name: format!("assets.{name}.service"),
                    reason: format!("no asset service named '{service_name}' is registered"),
                }
                .into());
            };

            if dry_run {
                info!(asset = %name, "asset build skipped due to dry run");
                continue;
            }

            let built = service
                .build_asset(Path::new(&path), state, repository)
                .map_err(|source| NyxError::UpstreamFailure {
                    name: service_name.clone(),
                    source,
                })?;
            debug!(asset = %name, path = %built.display(), "asset built");
        }

        state.assets = assets;

        if !dry_run {
            let latest = repository.latest_commit()?;
            let version = state.version.clone().unwrap_or_default();
            state.put_internal(INTERNAL_LAST_COMMIT, &latest);
            state.put_internal(STATE_VERSION, &version);
        }

        Ok(())
    }
}
