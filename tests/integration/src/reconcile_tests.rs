//! End-to-end reconciliation cycles
//!
//! Exercises the complete flow: metadata JSON -> user-data ingestion ->
//! change detection -> sudoers drop-in on disk.

use std::fs;
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use sudoers_core::{
    CloudInitAccounts, CycleOutcome, FixedClock, Result, ServiceControl, Snapshots,
    SudoersSyncer, run_cycle,
};
use sudoers_fs::NormalizedPath;
use sudoers_meta::{AgentConfig, Descriptor};
use sudoers_test_utils::{TEST_HEADER, TEST_VERSION, TestSudoers, test_instant};
use tempfile::TempDir;

#[derive(Clone, Default)]
struct NoopServices(Arc<Mutex<usize>>);

impl ServiceControl for NoopServices {
    fn start(&self, _name: &str) -> Result<()> {
        *self.0.lock().unwrap() += 1;
        Ok(())
    }
}

fn snapshot(user_data: &str, ssh_keys: Option<&str>, oslogin: Option<&str>) -> Descriptor {
    let mut attributes = serde_json::json!({
        "user-data": user_data,
        "hostname": "vm-1",
        "serial-port-enable": "1",
    });
    if let Some(keys) = ssh_keys {
        attributes["ssh-keys"] = keys.into();
    }
    if let Some(value) = oslogin {
        attributes["enable-oslogin"] = value.into();
    }
    let raw = serde_json::to_vec(&serde_json::json!({
        "instance": { "id": 42, "attributes": attributes },
        "project": { "projectId": "demo", "attributes": {} },
    }))
    .unwrap();
    Descriptor::from_json(&raw).unwrap()
}

fn accounts(sudoers: &TestSudoers, config: AgentConfig) -> CloudInitAccounts {
    let syncer = SudoersSyncer::new(
        sudoers.path(),
        TEST_VERSION,
        Arc::new(FixedClock(test_instant())),
    )
    .with_file_mode(0o640);
    CloudInitAccounts::new(syncer, config).with_services(NoopServices::default())
}

const ALICE: &str = "#cloud-config\nusers:\n  - default\n  - name: alice\n    sudo: ALL=(ALL) NOPASSWD:ALL\n";
const ALICE_AND_BOB: &str = "#cloud-config\nusers:\n  - name: bob\n    sudo: [\"ALL=(ALL) /usr/bin/systemctl\"]\n  - name: alice\n    sudo: ALL=(ALL) NOPASSWD:ALL\n    ssh_authorized_keys: [ssh-ed25519 AAAA]\n";

#[test]
fn test_cycles_converge_and_stay_stable() {
    if cfg!(windows) {
        return;
    }
    let sudoers = TestSudoers::new();
    let manager = accounts(&sudoers, AgentConfig::default());
    let empty = snapshot("", Some("alice:ssh-ed25519 AAAA"), None);
    let first = snapshot(ALICE, Some("alice:ssh-ed25519 AAAA"), None);
    let second = snapshot(ALICE_AND_BOB, Some("alice:ssh-ed25519 AAAA"), None);

    let outcome = run_cycle(&manager, &Snapshots { old: &empty, new: &first }).unwrap();
    assert_eq!(outcome, CycleOutcome::Applied);

    let outcome = run_cycle(&manager, &Snapshots { old: &first, new: &first }).unwrap();
    assert_eq!(outcome, CycleOutcome::Unchanged);

    let outcome = run_cycle(&manager, &Snapshots { old: &first, new: &second }).unwrap();
    assert_eq!(outcome, CycleOutcome::Applied);

    assert_eq!(
        sudoers.read(),
        format!(
            "{TEST_HEADER}\n\
             \n\
             # User rules for alice\n\
             alice ALL=(ALL) NOPASSWD:ALL\n\
             \n\
             # User rules for bob\n\
             bob ALL=(ALL) /usr/bin/systemctl\n"
        )
    );
}

#[test]
fn test_oslogin_enable_removes_sudoers() {
    if cfg!(windows) {
        return;
    }
    let sudoers = TestSudoers::new();
    let manager = accounts(&sudoers, AgentConfig::default());
    let before = snapshot(ALICE, Some("alice:ssh-ed25519 AAAA"), None);
    let after = snapshot(ALICE, None, None);

    run_cycle(&manager, &Snapshots { old: &Descriptor::default(), new: &before }).unwrap();
    assert!(sudoers.exists());

    // Accounts unchanged, but the keys attribute went away
    let outcome = run_cycle(&manager, &Snapshots { old: &before, new: &after }).unwrap();
    assert_eq!(outcome, CycleOutcome::Unchanged);

    let gated = snapshot(ALICE, None, Some("true"));
    let outcome = run_cycle(&manager, &Snapshots { old: &before, new: &gated }).unwrap();
    assert_eq!(outcome, CycleOutcome::Disabled);

    // Scheduler calls set directly once OS Login is switched on
    use sudoers_core::Manager;
    assert!(manager.diff(&Snapshots { old: &before, new: &gated }).unwrap());
    manager.set(&Snapshots { old: &before, new: &after }).unwrap();
    assert!(!sudoers.exists());
}

#[test]
fn test_daemon_config_file_disables_cycle() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("agent.toml");
    fs::write(&config_path, "[daemons]\naccounts_daemon = false\n").unwrap();
    let config = AgentConfig::load(&NormalizedPath::new(&config_path)).unwrap();

    let sudoers = TestSudoers::new();
    let manager = accounts(&sudoers, config);
    let new = snapshot(ALICE, Some("alice:ssh-ed25519 AAAA"), None);

    let outcome = run_cycle(&manager, &Snapshots { old: &Descriptor::default(), new: &new }).unwrap();

    assert_eq!(outcome, CycleOutcome::Disabled);
    assert!(!sudoers.exists());
}

#[test]
fn test_invalid_user_data_means_no_accounts() {
    let sudoers = TestSudoers::new();
    let manager = accounts(&sudoers, AgentConfig::default());
    let broken = snapshot("users: [\n  - name: alice", Some("alice:ssh-ed25519 AAAA"), None);
    let empty = snapshot("", Some("alice:ssh-ed25519 AAAA"), None);

    assert!(broken.user_data().is_empty());
    use sudoers_core::Manager;
    assert!(!manager.diff(&Snapshots { old: &empty, new: &broken }).unwrap());
}
