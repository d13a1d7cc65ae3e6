//! Error types for the kibsync CLI.
//!
//! One structured error enum for the whole crate, with context-aware
//! recovery hints for the common operator mistakes. Every remote call is
//! attempted exactly once; any failure aborts the run with exit code 1.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for kibsync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in kibsync operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Manifest not found: {path}")]
    ManifestMissing { path: PathBuf },

    #[error("Manifest patch not found: {path}")]
    PatchMissing { path: PathBuf },

    #[error("Invalid object reference '{0}' (expected type=id)")]
    InvalidObjectRef(String),

    /// Error envelope returned by the remote store.
    #[error("Remote error {status_code} ({error}): {message}")]
    Remote {
        status_code: u64,
        error: String,
        message: String,
    },

    /// The import API reported `success: false`.
    #[error("Import rejected by the remote store (raw response kept at {})", response_path.display())]
    ImportFailed { response_path: PathBuf },

    #[error("Summarizer error: {0}")]
    Summarizer(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Context-aware recovery hint for the operator.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::ManifestMissing { .. } => Some(
                "Run `kibsync init` to create a manifest from a full export."
                    .to_string(),
            ),

            Self::Config(msg) if msg.contains("KIBANA_URL") => Some(
                "Set KIBANA_URL in the environment or in .kibsync.env, \
                 then verify with `kibsync auth`."
                    .to_string(),
            ),

            Self::ImportFailed { response_path } => Some(format!(
                "Inspect {} for the per-object errors, fix the offending \
                 files under objects/, and re-run the push.",
                response_path.display()
            )),

            Self::InvalidObjectRef(_) => Some(
                "References are written as type=id, e.g. \
                 dashboard=722b74f0-b882-11e8-a6d9-e546fe2bba5f"
                    .to_string(),
            ),

            _ => None,
        }
    }
}
