//! Reconciliation contract for cloud-init sudoers
//!
//! An external scheduler keeps the previous and current metadata snapshots and,
//! once per change, asks a [`Manager`] whether it is `disabled`, whether the
//! change matters (`diff`), and finally to `set` the host state.

use sudoers_meta::{AgentConfig, Descriptor};

use crate::detector::needs_resync;
use crate::oslogin::{MetadataOsLogin, OsLoginLookup, enabled_or_default};
use crate::service::{SSH_SERVICES, ServiceControl, Systemctl};
use crate::sudoers::SudoersSyncer;
use crate::Result;

/// Previous and current metadata snapshots of one reconciliation cycle.
#[derive(Debug, Clone, Copy)]
pub struct Snapshots<'a> {
    pub old: &'a Descriptor,
    pub new: &'a Descriptor,
}

/// State-query and action interface driven by the scheduler.
pub trait Manager {
    /// Whether the snapshots differ in a way this manager acts on.
    fn diff(&self, snapshots: &Snapshots<'_>) -> Result<bool>;

    /// Whether a pending action has expired.
    fn timeout(&self, snapshots: &Snapshots<'_>) -> Result<bool>;

    /// Whether this manager must not run at all.
    fn disabled(&self, snapshots: &Snapshots<'_>) -> Result<bool>;

    /// Apply the current snapshot to the host.
    fn set(&self, snapshots: &Snapshots<'_>) -> Result<()>;
}

/// Keeps the cloud-init sudoers drop-in in line with `user-data`.
pub struct CloudInitAccounts {
    syncer: SudoersSyncer,
    config: AgentConfig,
    oslogin: Box<dyn OsLoginLookup>,
    services: Box<dyn ServiceControl>,
}

impl CloudInitAccounts {
    /// Create a manager that reads OS Login state from metadata and starts
    /// services through systemd.
    pub fn new(syncer: SudoersSyncer, config: AgentConfig) -> Self {
        Self {
            syncer,
            config,
            oslogin: Box::new(MetadataOsLogin),
            services: Box::new(Systemctl),
        }
    }

    pub fn with_oslogin(mut self, oslogin: impl OsLoginLookup + 'static) -> Self {
        self.oslogin = Box::new(oslogin);
        self
    }

    pub fn with_services(mut self, services: impl ServiceControl + 'static) -> Self {
        self.services = Box::new(services);
        self
    }

    pub fn syncer(&self) -> &SudoersSyncer {
        &self.syncer
    }

    fn oslogin_enabled(&self, descriptor: &Descriptor) -> bool {
        enabled_or_default(self.oslogin.as_ref(), descriptor)
    }
}

impl Manager for CloudInitAccounts {
    fn diff(&self, snapshots: &Snapshots<'_>) -> Result<bool> {
        Ok(needs_resync(
            self.oslogin_enabled(snapshots.old),
            self.oslogin_enabled(snapshots.new),
            snapshots.old.user_data(),
            snapshots.new.user_data(),
        ))
    }

    fn timeout(&self, _snapshots: &Snapshots<'_>) -> Result<bool> {
        Ok(false)
    }

    fn disabled(&self, snapshots: &Snapshots<'_>) -> Result<bool> {
        Ok(cfg!(windows)
            || self.oslogin_enabled(snapshots.new)
            || !self.config.accounts_daemon_enabled())
    }

    fn set(&self, snapshots: &Snapshots<'_>) -> Result<()> {
        let accounts = snapshots.new.user_data();
        if !accounts.is_empty() {
            tracing::info!(count = accounts.len(), "Creating cloud init sudoers");
            let report = self.syncer.sync_all(accounts);
            tracing::debug!(
                changed = report.changed(),
                failed = report.failed.len(),
                "Cloud init sudoers synced"
            );
        }

        // No ssh-keys attribute: OS Login owns access, drop the cloud-init grants
        if snapshots.new.ssh_keys().is_none() {
            tracing::info!(path = %self.syncer.path(), "Removing cloud init sudoers");
            match self.syncer.remove() {
                Ok(true) => {}
                Ok(false) => tracing::info!("Cloud init sudoers already absent"),
                Err(e) => tracing::error!(error = %e, "Error removing cloud init sudoers"),
            }
        }

        for service in SSH_SERVICES {
            // Either unit may be missing on a given distribution
            if let Err(e) = self.services.start(service) {
                tracing::debug!(service, error = %e, "Ignoring service start failure");
            }
        }

        Ok(())
    }
}

/// Result of one reconciliation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Disabled,
    Unchanged,
    Applied,
}

/// Run a single `disabled -> diff -> set` sequence.
pub fn run_cycle(manager: &dyn Manager, snapshots: &Snapshots<'_>) -> Result<CycleOutcome> {
    if manager.disabled(snapshots)? {
        tracing::debug!("Cloud init accounts manager disabled");
        return Ok(CycleOutcome::Disabled);
    }

    if !manager.diff(snapshots)? {
        return Ok(CycleOutcome::Unchanged);
    }

    manager.set(snapshots)?;
    Ok(CycleOutcome::Applied)
}
