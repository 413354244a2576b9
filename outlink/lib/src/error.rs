use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted while loading decoration options.
///
/// The decoration pass itself never fails; only reading and parsing
/// option records can.
#[derive(Debug, Error)]
pub enum OutlinkError {
    #[error("Failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML options: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON options: {0}")]
    Json(#[from] serde_json::Error),
}
