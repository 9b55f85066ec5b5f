//! Server Registry - database server registry and connection-parameter resolver
//!
//! This crate provides:
//! - Validated server definitions built from raw configuration mappings
//! - A registry tracking the current server of a session
//! - Effective per-server configuration with global defaults backfilled
//! - Separate parameter sets for the user and control connections

pub mod cli;
pub mod config;
pub mod connect;
pub mod error;
pub mod record;
pub mod store;

pub use config::{Credentials, RegistryConfig, Server};
pub use connect::{Connector, TcpProbe};
pub use error::{RegistryError, Result};
pub use record::{RawConfig, TypedRecord, ValidatedRecord};
pub use store::{ConnectionParams, ConnectionRole, ServerRegistry, Stores};
