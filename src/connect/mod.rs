//! Boundary to the component that opens live database connections

mod probe;

pub use probe::TcpProbe;

use crate::store::{ConnectionParams, ConnectionRole};

pub const TRACING_TARGET: &str = "server_registry::connect";

/// Opens a connection for a role from resolved parameters
pub trait Connector: Send {
    /// Whether the connection was established
    fn connect(&mut self, role: ConnectionRole, params: &ConnectionParams) -> bool;
}
