use std::path::PathBuf;

use tracing::{debug, info};

use nyx_git::Repository;

use crate::services::ServiceRegistry;
use crate::state::State;
use crate::{NyxError, Result};

use super::Command;

const STATE_VERSION: &str = "Publish.state.version";
const STATE_NEW_RELEASE: &str = "Publish.state.newRelease";

/// Creates the release on every configured hosting service. Publishing is
/// idempotent: a release that already exists for the tag is left untouched.
pub(crate) struct Publish;

impl Command for Publish {
    fn name(&self) -> &'static str {
        "Publish"
    }

    fn is_up_to_date(&self, state: &State, _repository: &Repository) -> Result<bool> {
        let Some(version) = state.version.as_deref() else {
            return Ok(false);
        };
        Ok(state.internal_matches(STATE_VERSION, version)
            && state.internal_matches(STATE_NEW_RELEASE, &state.new_release.to_string()))
    }

    fn run(
        &self,
        state: &mut State,
        _repository: &Repository,
        services: &ServiceRegistry,
    ) -> Result<()> {
        debug!("running the Publish command");

        let configuration = state.configuration();
        let dry_run = configuration.get_dry_run();
        let prefix = configuration.get_release_prefix();
        let configured_services = configuration.get_services();

        if state.new_release {
            let release_type = super::resolve_release_type(state)?;
            let Some(version) = state.version.clone() else {
                return Ok(());
            };
            let tag_name = format!("{prefix}{version}");
            let body = match &release_type.publish_message {
                Some(template) => nyx_template::render(template, &state.to_context())?,
                None => String::new(),
            };
            let assets: Vec<PathBuf> = state
                .assets
                .values()
                .map(|asset| PathBuf::from(&asset.path))
                .collect();

            for name in configured_services.keys() {
                let Some(service) = services.publish_service(name) else {
                    return Err(NyxError::ServiceUnknown { name: name.clone() });
                };

                if dry_run {
                    info!(service = %name, "release creation skipped due to dry run");
                    continue;
                }

                let existing = service.get_release(&tag_name).map_err(|source| {
                    NyxError::UpstreamFailure {
                        name: name.clone(),
                        source,
                    }
                })?;
                if existing.is_some() {
                    debug!(service = %name, tag = %tag_name, "release already exists");
                    continue;
                }

                service
                    .create_release(&tag_name, &body, &assets)
                    .map_err(|source| NyxError::UpstreamFailure {
                        name: name.clone(),
                        source,
                    })?;
                info!(service = %name, tag = %tag_name, "release published");
            }
        } else {
            info!("no new release to publish");
        }

        if !dry_run {
            let version = state.version.clone().unwrap_or_default();
            let new_release = state.new_release.to_string();
            state.put_internal(STATE_VERSION, &version);
            state.put_internal(STATE_NEW_RELEASE, &new_release);
        }

        Ok(())
    }
}
