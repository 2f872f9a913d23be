//! Change detection and sudoers synchronization for cloud-init accounts
//!
//! This crate sits on top of the filesystem and metadata layers and implements:
//!
//! - **Change detection**: whether two metadata snapshots require a resync
//! - **Sudoers synchronization**: idempotent create-or-append of the drop-in
//! - **Reconciliation contract**: the `diff`/`timeout`/`disabled`/`set`
//!   interface an external scheduler drives once per metadata change
//!
//! # Architecture
//!
//! ```text
//!              scheduler (external)
//!                      |
//!               sudoers-core
//!                 |        |
//!          sudoers-meta  sudoers-fs
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sudoers_core::{CloudInitAccounts, Manager, Snapshots, SudoersSyncer, SystemClock};
//! use sudoers_meta::{AgentConfig, Descriptor};
//!
//! fn example(old: &Descriptor, new: &Descriptor) -> sudoers_core::Result<()> {
//!     let syncer = SudoersSyncer::new(
//!         sudoers_fs::DEFAULT_SUDOERS_PATH,
//!         "1.0.0",
//!         Arc::new(SystemClock),
//!     );
//!     let accounts = CloudInitAccounts::new(syncer, AgentConfig::default());
//!     let snapshots = Snapshots { old, new };
//!
//!     if !accounts.disabled(&snapshots)? && accounts.diff(&snapshots)? {
//!         accounts.set(&snapshots)?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod detector;
pub mod error;
pub mod logging;
pub mod manager;
pub mod oslogin;
pub mod service;
pub mod sudoers;

pub use clock::{Clock, FixedClock, SystemClock};
pub use detector::{accounts_equivalent, needs_resync};
pub use error::{Error, Result};
pub use manager::{CloudInitAccounts, CycleOutcome, Manager, Snapshots, run_cycle};
pub use oslogin::{MetadataOsLogin, OsLoginLookup};
pub use service::{SSH_SERVICES, ServiceControl, Systemctl};
pub use sudoers::{SudoersSyncer, SyncAction, SyncReport, render_block};
