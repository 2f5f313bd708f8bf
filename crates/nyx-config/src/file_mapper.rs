//! Loads and saves structured documents, choosing the format by extension.
//!
//! `.json` maps through `serde_json`; `.yaml` and `.yml` through `serde_yml`.
//! Unknown extensions fall back to YAML on load (YAML is a superset of the
//! JSON documents Nyx writes) and are rejected on save.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("I/O failure")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON document")]
    Json(#[from] serde_json::Error),

    #[error("malformed YAML document")]
    Yaml(#[from] serde_yml::Error),

    #[error("unsupported file extension '{extension}'")]
    Extension { extension: String },
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// # Errors
///
/// Returns an error if the file cannot be read or does not parse in the
/// format implied by its extension.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T, FileError> {
    let content = std::fs::read_to_string(path)?;
    match extension_of(path).as_str() {
        "json" => Ok(serde_json::from_str(&content)?),
        _ => Ok(serde_yml::from_str(&content)?),
    }
}

/// # Errors
///
/// Returns an error if the value cannot be serialized, the extension is not
/// a known format, or the file cannot be written.
pub fn save<T: Serialize>(path: &Path, value: &T) -> Result<(), FileError> {
    let content = match extension_of(path).as_str() {
        "json" => serde_json::to_string_pretty(value)?,
        "yaml" | "yml" => serde_yml::to_string(value)?,
        other => {
            return Err(FileError::Extension {
                extension: other.to_string(),
            })
        }
    };
    std::fs::write(path, content)?;
    Ok(())
}
