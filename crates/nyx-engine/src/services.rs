use std::collections::HashMap;
use std::path::{Path, PathBuf};

use nyx_git::Repository;

use crate::state::State;

/// What service implementations return; the engine wraps failures into
/// `NyxError::UpstreamFailure` with the service name attached.
pub type ServiceResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// A published release, identified by its tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseHandle {
    pub tag: String,
    pub url: Option<String>,
}

/// Builds one release artifact. Implementations are named and resolved
/// through the [`ServiceRegistry`].
pub trait AssetService {
    /// # Errors
    ///
    /// Returns an error when the artifact cannot be produced.
    fn build_asset(
        &self,
        path: &Path,
        state: &State,
        repository: &Repository,
    ) -> ServiceResult<PathBuf>;
}

/// Creates releases on a hosting service.
pub trait PublishService {
    /// # Errors
    ///
    /// Returns an error when the remote call fails.
    fn create_release(
        &self,
        tag_name: &str,
        body: &str,
        assets: &[PathBuf],
    ) -> ServiceResult<ReleaseHandle>;

    /// # Errors
    ///
    /// Returns an error when the remote call fails; an absent release is
    /// `Ok(None)`.
    fn get_release(&self, tag_name: &str) -> ServiceResult<Option<ReleaseHandle>>;
}

/// Name-keyed resolution of asset and publish services. The registry is
/// populated by the embedding surface (CLI, plugin); the commands only look
/// names up.
#[derive(Default)]
pub struct ServiceRegistry {
    asset_services: HashMap<String, Box<dyn AssetService>>,
    publish_services: HashMap<String, Box<dyn PublishService>>,
}

impl ServiceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_asset_service(&mut self, name: &str, service: Box<dyn AssetService>) {
        self.asset_services.insert(name.to_string(), service);
    }

    pub fn register_publish_service(&mut self, name: &str, service: Box<dyn PublishService>) {
        self.publish_services.insert(name.to_string(), service);
    }

    #[must_use]
    pub fn asset_service(&self, name: &str) -> Option<&dyn AssetService> {
        self.asset_services.get(name).map(AsRef::as_ref)
    }

    #[must_use]
    pub fn publish_service(&self, name: &str) -> Option<&dyn PublishService> {
        self.publish_services.get(name).map(AsRef::as_ref)
    }
}
