use thiserror::Error;

#[derive(Debug, Error)]
pub enum NyxError {
    #[error(transparent)]
    Config(#[from] nyx_config::ConfigError),

    #[error(transparent)]
    Git(#[from] nyx_git::GitError),

    #[error(transparent)]
    Version(#[from] nyx_version::VersionError),

    #[error(transparent)]
    Template(#[from] nyx_template::TemplateError),

    #[error("no release type matches branch '{branch}'")]
    NoMatchingReleaseType { branch: String },

    #[error("no service named '{name}' is registered")]
    ServiceUnknown { name: String },

    #[error("service '{name}' failed")]
    UpstreamFailure {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("version '{version}' does not satisfy the version range '{range}'")]
    VersionOutOfRange { version: String, range: String },

    #[error("cannot acquire credentials for service '{name}': {reason}")]
    Security { name: String, reason: String },
}

impl NyxError {
    /// The process exit code family this error maps to: 1 configuration,
    /// 2 git, 3 release, 4 transport or credentials.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Version(_) | Self::Template(_) => 1,
            Self::Git(nyx_git::GitError::Auth { .. } | nyx_git::GitError::Protocol { .. }) => 4,
            Self::Git(_) => 2,
            Self::NoMatchingReleaseType { .. }
            | Self::ServiceUnknown { .. }
            | Self::VersionOutOfRange { .. } => 3,
            Self::UpstreamFailure { .. } | Self::Security { .. } => 4,
        }
    }
}
