//! Local agent configuration
//!
//! ```toml
//! [daemons]
//! accounts_daemon = true
//! ```

use serde::{Deserialize, Serialize};
use sudoers_fs::{ConfigStore, NormalizedPath, io};

use crate::{Error, Result};

/// Daemon-local configuration consulted on every reconciliation cycle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub daemons: DaemonsConfig,
}

/// Per-daemon feature switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaemonsConfig {
    /// Account management, including cloud-init sudoers. On by default.
    #[serde(default = "default_true")]
    pub accounts_daemon: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DaemonsConfig {
    fn default() -> Self {
        Self {
            accounts_daemon: true,
        }
    }
}

impl AgentConfig {
    /// Load configuration, falling back to defaults when the file is absent.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        if !io::is_present(path)? {
            tracing::debug!(%path, "No agent config found, using defaults");
            return Ok(Self::default());
        }

        ConfigStore::new().load(path).map_err(|e| match e {
            sudoers_fs::Error::ConfigParse { path, message, .. } => {
                Error::InvalidConfig { path, message }
            }
            other => Error::Fs(other),
        })
    }

    pub fn accounts_daemon_enabled(&self) -> bool {
        self.daemons.accounts_daemon
    }
}
