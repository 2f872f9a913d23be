//! [`MetadataBuilder`] for metadata snapshots.

use serde_json::{Map, Value, json};
use sudoers_meta::Descriptor;

/// Builds a metadata snapshot through its JSON form, so tests exercise the
/// same decoding path as real metadata.
///
/// # Example
///
/// ```rust
/// use sudoers_test_utils::MetadataBuilder;
///
/// let descriptor = MetadataBuilder::new()
///     .user("alice", &["ALL=(ALL) NOPASSWD:ALL"])
///     .ssh_keys(&["alice:ssh-ed25519 AAAA"])
///     .build();
/// assert_eq!(descriptor.user_data()[0].name, "alice");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetadataBuilder {
    users: Vec<(String, Vec<String>)>,
    raw_user_data: Option<String>,
    ssh_keys: Option<Vec<String>>,
    instance_oslogin: Option<String>,
    project_oslogin: Option<String>,
}

impl MetadataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a cloud-init user with a list of sudo rules.
    pub fn user(mut self, name: &str, rules: &[&str]) -> Self {
        self.users
            .push((name.to_string(), rules.iter().map(|r| r.to_string()).collect()));
        self
    }

    /// Use `document` verbatim as the `user-data` YAML; overrides [`Self::user`].
    pub fn raw_user_data(mut self, document: &str) -> Self {
        self.raw_user_data = Some(document.to_string());
        self
    }

    pub fn ssh_keys(mut self, keys: &[&str]) -> Self {
        self.ssh_keys = Some(keys.iter().map(|k| k.to_string()).collect());
        self
    }

    pub fn oslogin(mut self, value: &str) -> Self {
        self.instance_oslogin = Some(value.to_string());
        self
    }

    pub fn project_oslogin(mut self, value: &str) -> Self {
        self.project_oslogin = Some(value.to_string());
        self
    }

    /// Render the `user-data` YAML document.
    pub fn user_data_document(&self) -> Option<String> {
        if let Some(raw) = &self.raw_user_data {
            return Some(raw.clone());
        }
        if self.users.is_empty() {
            return None;
        }

        let mut document = String::from("#cloud-config\nusers:\n");
        for (name, rules) in &self.users {
            document.push_str(&format!("  - name: {name}\n    sudo:\n"));
            for rule in rules {
                document.push_str(&format!("      - {}\n", Value::String(rule.clone())));
            }
        }
        Some(document)
    }

    /// JSON form of the snapshot.
    pub fn to_json(&self) -> Value {
        let mut instance = Map::new();
        if let Some(document) = self.user_data_document() {
            instance.insert("user-data".into(), Value::String(document));
        }
        if let Some(keys) = &self.ssh_keys {
            instance.insert("ssh-keys".into(), Value::String(keys.join("\n")));
        }
        if let Some(value) = &self.instance_oslogin {
            instance.insert("enable-oslogin".into(), Value::String(value.clone()));
        }

        let mut project = Map::new();
        if let Some(value) = &self.project_oslogin {
            project.insert("enable-oslogin".into(), Value::String(value.clone()));
        }

        json!({
            "instance": { "attributes": instance },
            "project": { "attributes": project },
        })
    }

    /// # Panics
    /// Panics if the rendered snapshot does not decode.
    pub fn build(&self) -> Descriptor {
        let raw = serde_json::to_vec(&self.to_json()).unwrap();
        Descriptor::from_json(&raw).unwrap_or_else(|e| panic!("MetadataBuilder::build: {e}"))
    }
}
