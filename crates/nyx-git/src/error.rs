use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("git operation failed")]
    Git(#[from] git2::Error),

    #[error("not a git repository: '{path}'")]
    NotARepository { path: PathBuf },

    #[error("object '{name}' not found in the repository")]
    NotFound { name: String },

    #[error("reference '{refspec}' is ambiguous")]
    Ambiguous { refspec: String },

    #[error("HEAD is detached, not on a branch")]
    Detached,

    #[error("working tree has uncommitted changes")]
    Dirty,

    #[error("authentication rejected by remote '{remote}'")]
    Auth {
        remote: String,
        #[source]
        source: git2::Error,
    },

    #[error("transport failure while talking to remote '{remote}'")]
    Protocol {
        remote: String,
        #[source]
        source: git2::Error,
    },

    #[error("I/O failure on the repository")]
    Io(#[source] std::io::Error),
}

impl GitError {
    /// Classifies a `git2` failure from a remote interaction into the
    /// authentication or transport variant.
    pub(crate) fn from_remote(remote: &str, source: git2::Error) -> Self {
        match source.class() {
            git2::ErrorClass::Http | git2::ErrorClass::Net | git2::ErrorClass::Ssh
                if source.code() != git2::ErrorCode::Auth =>
            {
                Self::Protocol {
                    remote: remote.to_string(),
                    source,
                }
            }
            _ if source.code() == git2::ErrorCode::Auth => Self::Auth {
                remote: remote.to_string(),
                source,
            },
            _ => Self::Protocol {
                remote: remote.to_string(),
                source,
            },
        }
    }
}
