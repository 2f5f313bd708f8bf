use std::path::PathBuf;

use thiserror::Error;

use crate::file_mapper::FileError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read or write '{path}'")]
    DataAccess {
        path: PathBuf,
        #[source]
        source: FileError,
    },

    #[error("illegal value for configuration option '{name}': {reason}")]
    IllegalProperty { name: String, reason: String },
}

impl ConfigError {
    pub(crate) fn illegal(name: &str, reason: impl Into<String>) -> Self {
        Self::IllegalProperty {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
