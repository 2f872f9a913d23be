//! Instance metadata and cloud-init user-data ingestion.
//!
//! This crate turns a metadata snapshot into typed values:
//!
//! - [`Descriptor`]: one snapshot of instance and project attributes
//! - [`UserData`]: the normalized account list carried in the `user-data`
//!   attribute, itself a YAML document wrapped in a JSON string
//! - [`AgentConfig`]: the daemon's own local configuration

pub mod config;
pub mod descriptor;
pub mod error;
pub mod user_data;

pub use config::{AgentConfig, DaemonsConfig};
pub use descriptor::{Attributes, Descriptor, Instance, Project, ProjectAttributes};
pub use error::{Error, Result};
pub use user_data::{Account, SudoSpec, UserData, parse_user_data};
