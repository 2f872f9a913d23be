//! Error types for sudoers-core

/// Result type for sudoers-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sudoers-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `enable-oslogin` holds something other than a boolean
    #[error("Invalid enable-oslogin value: {value:?}")]
    OsLogin { value: String },

    /// A service could not be started
    #[error("Failed to start service {name}: {message}")]
    Service { name: String, message: String },

    /// Filesystem error from sudoers-fs
    #[error(transparent)]
    Fs(#[from] sudoers_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
