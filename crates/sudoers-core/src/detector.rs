//! Change detection between two metadata snapshots.
//!
//! Only names and sudo rules take part in the comparison. SSH keys are
//! reconciled by the accounts daemon proper and are deliberately ignored here,
//! so a key rotation alone never rewrites the sudoers drop-in.

use std::collections::{BTreeSet, HashMap};

use sudoers_meta::Account;

/// Whether the sudoers drop-in must be resynchronized.
///
/// A flip of the OS Login flag always forces a resync, whatever the accounts.
pub fn needs_resync(
    prev_enabled: bool,
    curr_enabled: bool,
    prev: &[Account],
    curr: &[Account],
) -> bool {
    if prev_enabled != curr_enabled {
        tracing::debug!(prev_enabled, curr_enabled, "OS Login state changed");
        return true;
    }

    !accounts_equivalent(prev, curr)
}

/// Order-insensitive equivalence of two account lists.
///
/// Both lists must hold the same multiset of names, and for every name the
/// sudo rules must match as sets.
pub fn accounts_equivalent(first: &[Account], second: &[Account]) -> bool {
    if first.len() != second.len() {
        return false;
    }

    if name_counts(first) != name_counts(second) {
        return false;
    }

    let by_name: HashMap<&str, &Account> = first
        .iter()
        .map(|account| (account.name.as_str(), account))
        .collect();

    second.iter().all(|account| {
        by_name
            .get(account.name.as_str())
            .is_some_and(|other| rules_equal(&other.sudo_rules, &account.sudo_rules))
    })
}

fn name_counts(accounts: &[Account]) -> HashMap<&str, usize> {
    let mut counts = HashMap::with_capacity(accounts.len());
    for account in accounts {
        *counts.entry(account.name.as_str()).or_insert(0) += 1;
    }
    counts
}

fn rules_equal(first: &[String], second: &[String]) -> bool {
    let first: BTreeSet<&str> = first.iter().map(String::as_str).collect();
    let second: BTreeSet<&str> = second.iter().map(String::as_str).collect();
    first == second
}
