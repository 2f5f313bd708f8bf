use indexmap::IndexMap;
use tracing::debug;

use nyx_git::Repository;

use crate::services::ServiceRegistry;
use crate::state::{ResolvedAsset, State};
use crate::Result;

use super::Command;

const CONFIGURED_ASSETS: &str = "Arrange.configured.assets";

/// Stages the configured asset definitions onto the state, validating their
/// path templates. Rendering against the computed version happens in Make,
/// after Infer has run.
pub(crate) struct Arrange;

impl Command for Arrange {
    fn name(&self) -> &'static str {
        "Arrange"
    }

    fn is_up_to_date(&self, state: &State, _repository: &Repository) -> Result<bool> {
        let fingerprint = assets_fingerprint(state);
        Ok(state.internal_matches(CONFIGURED_ASSETS, &fingerprint)
            && state.assets.len() == state.configuration().get_assets().len())
    }

    fn run(
        &self,
        state: &mut State,
        _repository: &Repository,
        _services: &ServiceRegistry,
    ) -> Result<()> {
        debug!("running the Arrange command");

        let configuration = state.configuration();
        let dry_run = configuration.get_dry_run();
        let configured = configuration.get_assets();
        let fingerprint = assets_fingerprint(state);

        let context = state.to_context();
        let mut staged = IndexMap::new();
        for (name, asset) in &configured {
            // a malformed template must fail here, not halfway through Make
            nyx_template::render(&asset.path, &context)?;
            staged.insert(
                name.clone(),
                ResolvedAsset {
                    path: asset.path.clone(),
                    service: asset.service.clone(),
                },
            );
        }
        debug!(assets = staged.len(), "asset definitions staged");
        state.assets = staged;

        if !dry_run {
            state.put_internal(CONFIGURED_ASSETS, &fingerprint);
        }

        Ok(())
    }
}

fn assets_fingerprint(state: &State) -> String {
    serde_json::to_string(&state.configuration().get_assets()).unwrap_or_default()
}
