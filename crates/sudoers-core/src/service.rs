//! Best-effort service control.

use std::process::Command;

use crate::{Error, Result};

/// SSH daemon unit names across distributions.
pub const SSH_SERVICES: [&str; 2] = ["ssh", "sshd"];

/// Starts OS services by name.
pub trait ServiceControl: Send + Sync {
    fn start(&self, name: &str) -> Result<()>;
}

/// `systemctl start <name>`
#[derive(Debug, Default, Clone, Copy)]
pub struct Systemctl;

impl ServiceControl for Systemctl {
    fn start(&self, name: &str) -> Result<()> {
        let output = Command::new("systemctl").args(["start", name]).output()?;

        if !output.status.success() {
            return Err(Error::Service {
                name: name.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        tracing::debug!(service = name, "Started service");
        Ok(())
    }
}
