//! Error types for sudoers-meta

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] sudoers_fs::Error),

    /// The `user-data` attribute is not a JSON string.
    #[error("Malformed user-data envelope: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    #[error("Malformed metadata snapshot: {0}")]
    MalformedMetadata(#[source] serde_json::Error),

    #[error("Invalid configuration at {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },
}
