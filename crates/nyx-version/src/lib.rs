mod bump;
mod maven;
mod scheme;
mod version;

pub use bump::Bump;
pub use maven::MavenVersion;
pub use scheme::{Scheme, UnknownScheme};
pub use version::Version;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("'{value}' is not a valid version under the {scheme} scheme")]
    Malformed { value: String, scheme: Scheme },

    #[error("'{value}' is not a valid bump identifier")]
    MalformedBump { value: String },

    #[error("'{value}' is not a valid prerelease qualifier")]
    MalformedPrerelease { value: String },
}

pub type Result<T> = std::result::Result<T, VersionError>;
