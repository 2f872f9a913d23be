//! Sudoers drop-in synchronization
//!
//! The drop-in is a header written once at creation, followed by one block per
//! account:
//!
//! ```text
//! # Created by guest-agent (for cloud-init) v. 1.2.3 on Tue, 17 Nov 2009 20:34:58 +0000
//!
//! # User rules for alice
//! alice ALL=(ALL) NOPASSWD:ALL
//! ```
//!
//! Blocks are only ever appended. A block already present verbatim is left
//! alone, which keeps repeated syncs with unchanged input byte-stable.

use std::sync::Arc;

use sudoers_fs::{NormalizedPath, SUDOERS_FILE_MODE, io};
use sudoers_meta::Account;

use crate::{Clock, Result};

/// What a single account sync did to the drop-in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// The file did not exist and was created with header and block.
    Created,
    /// The block was appended to an existing file.
    Appended,
    /// The block was already present verbatim.
    Unchanged,
}

/// Outcome of syncing a batch of accounts
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Accounts written or confirmed, in input order
    pub applied: Vec<(String, SyncAction)>,
    /// Accounts whose write failed, with the rendered error
    pub failed: Vec<(String, String)>,
}

impl SyncReport {
    /// True when no account failed
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of accounts that modified the file
    pub fn changed(&self) -> usize {
        self.applied
            .iter()
            .filter(|(_, action)| *action != SyncAction::Unchanged)
            .count()
    }
}

/// Render the block for one account: a blank line, a comment line and one
/// `<name> <rule>` line per rule, in the given order.
pub fn render_block(name: &str, rules: &[String]) -> String {
    let mut block = format!("\n# User rules for {}\n", name);
    for rule in rules {
        block.push_str(&format!("{} {}\n", name, rule));
    }
    block
}

/// Byte-level search; the file may carry text that is not valid UTF-8.
fn contains_block(existing: &[u8], block: &[u8]) -> bool {
    existing.windows(block.len()).any(|window| window == block)
}

/// Converges the cloud-init sudoers drop-in towards a list of accounts.
pub struct SudoersSyncer {
    path: NormalizedPath,
    agent_version: String,
    clock: Arc<dyn Clock>,
    file_mode: u32,
}

impl SudoersSyncer {
    /// Create a syncer for `path`, stamping new files with `agent_version`
    /// and the time given by `clock`.
    pub fn new(
        path: impl Into<NormalizedPath>,
        agent_version: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            path: path.into(),
            agent_version: agent_version.into(),
            clock,
            file_mode: SUDOERS_FILE_MODE,
        }
    }

    /// Override the mode applied to a newly created file.
    pub fn with_file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    /// Header line for a newly created file, without trailing newline.
    pub fn header(&self) -> String {
        let now = self.clock.now();
        format!(
            "# Created by guest-agent (for cloud-init) v. {} on {}",
            self.agent_version,
            now.format("%a, %d %b %Y %H:%M:%S %z")
        )
    }

    /// Make sure the block for `name` is present in the drop-in.
    pub fn sync_account(&self, name: &str, rules: &[String]) -> Result<SyncAction> {
        let block = render_block(name, rules);

        if io::is_present(&self.path)? {
            let existing = io::read_bytes(&self.path)?;
            if contains_block(&existing, block.as_bytes()) {
                tracing::debug!(user = name, path = %self.path, "Sudo rules already present");
                return Ok(SyncAction::Unchanged);
            }

            io::append_locked(&self.path, block.as_bytes())?;
            tracing::debug!(user = name, path = %self.path, "Appended sudo rules");
            return Ok(SyncAction::Appended);
        }

        let content = format!("{}\n{}", self.header(), block);
        io::write_atomic(&self.path, content.as_bytes(), Some(self.file_mode))?;
        tracing::debug!(user = name, path = %self.path, "Created sudoers file");
        Ok(SyncAction::Created)
    }

    /// Sync every account in order.
    ///
    /// A failure is logged and recorded; the remaining accounts are still
    /// attempted.
    pub fn sync_all(&self, accounts: &[Account]) -> SyncReport {
        let mut report = SyncReport::default();

        for account in accounts {
            match self.sync_account(&account.name, &account.sudo_rules) {
                Ok(action) => report.applied.push((account.name.clone(), action)),
                Err(e) => {
                    tracing::error!(
                        user = %account.name,
                        error = %e,
                        "Error updating cloud init sudo rules"
                    );
                    report.failed.push((account.name.clone(), e.to_string()));
                }
            }
        }

        report
    }

    /// Delete the drop-in. Returns `Ok(false)` if it did not exist.
    pub fn remove(&self) -> Result<bool> {
        Ok(io::remove_file(&self.path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedClock;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_block_without_rules() {
        assert_eq!(render_block("alice", &[]), "\n# User rules for alice\n");
    }

    #[test]
    fn test_render_block_keeps_rule_order() {
        let rules = vec!["rule2".to_string(), "rule1".to_string()];
        assert_eq!(
            render_block("alice", &rules),
            "\n# User rules for alice\nalice rule2\nalice rule1\n"
        );
    }

    #[test]
    fn test_header_uses_utc_rfc1123z() {
        let instant = "2009-11-17T23:34:58+03:00".parse().unwrap();
        let syncer = SudoersSyncer::new("/unused", "1.0.0", Arc::new(FixedClock(instant)));
        assert_eq!(
            syncer.header(),
            "# Created by guest-agent (for cloud-init) v. 1.0.0 on Tue, 17 Nov 2009 20:34:58 +0000"
        );
    }

    #[test]
    fn test_header_zero_pads_day() {
        let instant = "2024-03-05T07:08:09Z".parse().unwrap();
        let syncer = SudoersSyncer::new("/unused", "v", Arc::new(FixedClock(instant)));
        assert!(syncer.header().ends_with("on Tue, 05 Mar 2024 07:08:09 +0000"));
    }

    #[test]
    fn test_contains_block_ignores_encoding() {
        let block = render_block("alice", &["ALL=(ALL) ALL".to_string()]);
        let mut existing = b"# caf\xe9\n".to_vec();
        assert!(!contains_block(&existing, block.as_bytes()));

        existing.extend_from_slice(block.as_bytes());
        assert!(contains_block(&existing, block.as_bytes()));
        assert!(!contains_block(b"short", block.as_bytes()));
    }

    #[test]
    fn test_report_counts() {
        let report = SyncReport {
            applied: vec![
                ("a".into(), SyncAction::Created),
                ("b".into(), SyncAction::Unchanged),
                ("c".into(), SyncAction::Appended),
            ],
            failed: vec![],
        };
        assert!(report.is_clean());
        assert_eq!(report.changed(), 2);
    }
}
