//! Cloud-init `user-data` ingestion
//!
//! The `user-data` attribute is a JSON string whose content is a cloud-init
//! YAML document. Only the `users` list is consumed here:
//!
//! ```yaml
//! #cloud-config
//! users:
//!   - default
//!   - name: alice
//!     sudo: ALL=(ALL) NOPASSWD:ALL
//!     ssh_authorized_keys:
//!       - ssh-ed25519 AAAA... alice@host
//!   - name: bob
//!     sudo:
//!       - ALL=(ALL) /usr/bin/systemctl
//!       - ALL=(ALL) /usr/bin/journalctl
//! ```
//!
//! Only a malformed outer envelope is an error. A broken inner document yields
//! an empty list and a broken entry is skipped, so one bad account never blocks
//! the others.

use std::ops::Deref;

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

use crate::{Error, Result};

/// A cloud-init managed account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    pub ssh_keys: Vec<String>,
    /// Sudo rules in source order, without the leading user name.
    pub sudo_rules: Vec<String>,
}

impl Account {
    pub fn new(name: impl Into<String>, sudo_rules: Vec<String>) -> Self {
        Self {
            name: name.into(),
            ssh_keys: Vec::new(),
            sudo_rules,
        }
    }

    pub fn with_ssh_keys(mut self, ssh_keys: Vec<String>) -> Self {
        self.ssh_keys = ssh_keys;
        self
    }
}

/// Ordered list of accounts ingested from `user-data`.
///
/// An absent or unusable document is an empty list, never a missing one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserData(Vec<Account>);

impl UserData {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self(accounts)
    }

    /// Decode the JSON string envelope and ingest the YAML document inside it.
    pub fn from_envelope(raw: &[u8]) -> Result<Self> {
        let document: String = serde_json::from_slice(raw).map_err(Error::MalformedEnvelope)?;
        Ok(parse_user_data(&document))
    }

    pub fn accounts(&self) -> &[Account] {
        &self.0
    }
}

impl Deref for UserData {
    type Target = [Account];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Account>> for UserData {
    fn from(accounts: Vec<Account>) -> Self {
        Self(accounts)
    }
}

impl<'a> IntoIterator for &'a UserData {
    type Item = &'a Account;
    type IntoIter = std::slice::Iter<'a, Account>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for UserData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let document = String::deserialize(deserializer)?;
        Ok(parse_user_data(&document))
    }
}

/// Shape of the polymorphic `sudo` field of a cloud-init user.
#[derive(Debug, Clone, PartialEq)]
pub enum SudoSpec {
    /// Field missing or `null`.
    Absent,
    /// `sudo: ALL=(ALL) NOPASSWD:ALL`
    Rule(String),
    /// `sudo: [..]`; elements are validated during normalization.
    Rules(Vec<Value>),
    /// `sudo: false` (cloud-init's explicit "no sudo").
    Toggle(bool),
    /// Mappings, numbers and tagged values.
    Unrecognized(Value),
}

impl SudoSpec {
    pub fn from_value(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Absent,
            Some(Value::String(rule)) => Self::Rule(rule),
            Some(Value::Sequence(rules)) => Self::Rules(rules),
            Some(Value::Bool(flag)) => Self::Toggle(flag),
            Some(other) => Self::Unrecognized(other),
        }
    }

    /// Normalize into a rule list for `user`.
    ///
    /// Non-string list elements are dropped individually; an unrecognized
    /// shape yields no rules.
    pub fn into_rules(self, user: &str) -> Vec<String> {
        match self {
            Self::Absent => {
                tracing::debug!(user, "No sudo rules declared");
                Vec::new()
            }
            Self::Rule(rule) => vec![rule],
            Self::Rules(values) => values
                .into_iter()
                .filter_map(|value| match value {
                    Value::String(rule) => Some(rule),
                    other => {
                        tracing::error!(user, rule = ?other, "Cannot parse cloud-init sudo rule");
                        None
                    }
                })
                .collect(),
            Self::Toggle(_) => Vec::new(),
            Self::Unrecognized(other) => {
                tracing::error!(user, sudo = ?other, "Cannot parse sudo rules");
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawUser {
    /// Any scalar; `name: 1234` is the user "1234".
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    snapuser: Option<String>,
    #[serde(default)]
    ssh_authorized_keys: Option<Vec<String>>,
    #[serde(default)]
    sudo: Option<Value>,
}

/// Ingest a cloud-init YAML document into a [`UserData`] list.
///
/// Only the first document of a multi-document stream is read, and merge
/// keys (`<<: *anchor`) are expanded before the entries are decoded.
///
/// Never fails: an unparseable document logs and yields an empty list.
pub fn parse_user_data(document: &str) -> UserData {
    let Some(first) = serde_yaml::Deserializer::from_str(document).next() else {
        return UserData::default();
    };

    let mut root = match Value::deserialize(first) {
        Ok(root) => root,
        Err(e) => {
            tracing::info!(error = %e, "User-data yaml is invalid");
            return UserData::default();
        }
    };

    if let Err(e) = root.apply_merge() {
        tracing::info!(error = %e, "User-data yaml merge keys are invalid");
        return UserData::default();
    }

    let users = match root {
        Value::Null => return UserData::default(),
        Value::Mapping(mut mapping) => mapping.remove("users"),
        other => {
            tracing::info!(document = ?other, "User-data yaml is not a mapping");
            return UserData::default();
        }
    };

    let entries = match users {
        None | Some(Value::Null) => return UserData::default(),
        Some(Value::Sequence(entries)) => entries,
        Some(other) => {
            tracing::info!(users = ?other, "User-data users is not a list");
            return UserData::default();
        }
    };

    entries.into_iter().filter_map(parse_entry).collect::<Vec<_>>().into()
}

fn parse_entry(entry: Value) -> Option<Account> {
    let raw: RawUser = match serde_yaml::from_value(entry) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::info!(error = %e, "User-data user will not be parsed");
            return None;
        }
    };

    if raw.snapuser.as_deref().is_some_and(|s| !s.is_empty()) {
        tracing::info!("User-data snap user is ignored");
        return None;
    }

    let name = scalar_name(raw.name)?;
    if name.is_empty() {
        return None;
    }

    let sudo_rules = SudoSpec::from_value(raw.sudo).into_rules(&name);

    Some(Account {
        ssh_keys: raw.ssh_authorized_keys.unwrap_or_default(),
        sudo_rules,
        name,
    })
}

fn scalar_name(value: Option<Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => Some(String::new()),
        Some(Value::String(name)) => Some(name),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        Some(other) => {
            tracing::info!(name = ?other, "User-data user name is not a scalar");
            None
        }
    }
}
