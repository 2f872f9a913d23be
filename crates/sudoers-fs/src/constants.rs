//! Fixed locations and modes of the managed sudoers drop-in.

/// Sudoers drop-in managed for cloud-init users.
///
/// Platform dependent; only distributions reading `/etc/sudoers.d` are supported.
pub const DEFAULT_SUDOERS_PATH: &str = "/etc/sudoers.d/90-cloud-init-users";

/// Mode of a freshly created sudoers drop-in: owner and group read-only.
pub const SUDOERS_FILE_MODE: u32 = 0o440;
