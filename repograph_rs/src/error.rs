//! Error types for the fallible edges of the library.
//!
//! None of these escape [`crate::Analyzer::analyze`]: a failing manifest is
//! skipped and recorded as a diagnostic. They surface only through the
//! standalone parsing and config-loading APIs.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("field `{field}` is malformed: {reason}")]
    Malformed { field: String, reason: String },

    #[error("unsupported manifest file: {0}")]
    Unsupported(String),
}

impl ManifestError {
    pub(crate) fn malformed(field: &str, reason: impl Into<String>) -> Self {
        ManifestError::Malformed {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
