//! OS Login enablement lookup.
//!
//! When OS Login is active it owns privilege grants on the host and the
//! cloud-init sudoers drop-in must stay out of the way.

use sudoers_meta::Descriptor;

use crate::{Error, Result};

/// Reports whether OS Login is enabled for a metadata snapshot.
pub trait OsLoginLookup: Send + Sync {
    fn enabled(&self, descriptor: &Descriptor) -> Result<bool>;
}

/// Reads `enable-oslogin` from the snapshot; the instance value overrides
/// the project value and absence means disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetadataOsLogin;

impl OsLoginLookup for MetadataOsLogin {
    fn enabled(&self, descriptor: &Descriptor) -> Result<bool> {
        let value = descriptor
            .instance
            .attributes
            .enable_oslogin
            .as_deref()
            .or(descriptor.project.attributes.enable_oslogin.as_deref());

        match value {
            Some(value) => parse_flag(value),
            None => Ok(false),
        }
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "on" => Ok(true),
        "false" | "f" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::OsLogin {
            value: value.to_string(),
        }),
    }
}

/// Lookup that never fails: errors are logged and read as "not enabled".
pub(crate) fn enabled_or_default(lookup: &dyn OsLoginLookup, descriptor: &Descriptor) -> bool {
    lookup.enabled(descriptor).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to determine OS Login state");
        false
    })
}
