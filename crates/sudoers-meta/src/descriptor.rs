//! Instance metadata snapshot
//!
//! Only the attributes consumed by cloud-init account reconciliation are
//! modelled; every other key in the metadata document is ignored.

use serde::{Deserialize, Deserializer};

use crate::{Error, Result, UserData};

/// One snapshot of instance metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Descriptor {
    #[serde(default)]
    pub instance: Instance,
    #[serde(default)]
    pub project: Project,
}

impl Descriptor {
    /// Parse a metadata snapshot from its JSON form.
    pub fn from_json(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw).map_err(Error::MalformedMetadata)
    }

    /// Accounts declared in the instance `user-data`.
    pub fn user_data(&self) -> &UserData {
        &self.instance.attributes.user_data
    }

    /// Instance SSH keys, `None` when the attribute is absent.
    pub fn ssh_keys(&self) -> Option<&[String]> {
        self.instance.attributes.ssh_keys.as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Instance {
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub attributes: ProjectAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Attributes {
    #[serde(default)]
    pub user_data: UserData,
    #[serde(default, deserialize_with = "deserialize_ssh_keys")]
    pub ssh_keys: Option<Vec<String>>,
    #[serde(default)]
    pub enable_oslogin: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectAttributes {
    #[serde(default)]
    pub enable_oslogin: Option<String>,
}

/// `ssh-keys` is a newline separated string; blank lines are dropped.
fn deserialize_ssh_keys<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|keys| {
        keys.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }))
}
