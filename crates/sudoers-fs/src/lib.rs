//! Filesystem layer for cloud-init sudoers reconciliation
//!
//! Provides normalized paths, locked create/append primitives and a
//! format-agnostic configuration store.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::{DEFAULT_SUDOERS_PATH, SUDOERS_FILE_MODE};
pub use error::{Error, Result};
pub use path::NormalizedPath;
