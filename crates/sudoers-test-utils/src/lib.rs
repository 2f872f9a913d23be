//! Shared test utilities for the cloudinit-sudoers workspace.
//!
//! Dev-dependency only — never published.
//!
//! # Modules
//!
//! - [`metadata`] — [`MetadataBuilder`] for metadata snapshots
//! - [`sudoers`] — [`TestSudoers`] temporary sudoers directory

pub mod metadata;
pub mod sudoers;

pub use metadata::MetadataBuilder;
pub use sudoers::TestSudoers;

use chrono::{DateTime, Utc};

/// Agent version stamped into headers by tests.
pub const TEST_VERSION: &str = "test-version";

/// Header produced with [`TEST_VERSION`] at [`test_instant`].
pub const TEST_HEADER: &str =
    "# Created by guest-agent (for cloud-init) v. test-version on Tue, 17 Nov 2009 20:34:58 +0000";

/// The instant every deterministic test clock is frozen at.
///
/// # Panics
/// Never; the literal is a valid RFC 3339 timestamp.
pub fn test_instant() -> DateTime<Utc> {
    "2009-11-17T20:34:58.651387237Z"
        .parse()
        .expect("test_instant: invalid literal")
}
