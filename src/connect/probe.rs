//! Reachability connector

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde_json::Value;

use super::{Connector, TRACING_TARGET};
use crate::config::DEFAULT_PORT;
use crate::record::{is_empty_value, RawConfig};
use crate::store::{ConnectionParams, ConnectionRole};

/// Treats a server as connectable when its endpoint accepts a socket
/// connection. Uses the Unix socket when `host` is `localhost` and a
/// `socket` is configured, TCP otherwise.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn probe(&self, server: &RawConfig) -> io::Result<()> {
        let host = server
            .get("host")
            .and_then(Value::as_str)
            .filter(|host| !host.is_empty())
            .unwrap_or("localhost");

        #[cfg(unix)]
        {
            let socket = server
                .get("socket")
                .and_then(Value::as_str)
                .filter(|socket| !socket.is_empty());

            if let (true, Some(socket)) = (host == "localhost", socket) {
                std::os::unix::net::UnixStream::connect(socket)?;
                return Ok(());
            }
        }

        let port = server
            .get("port")
            .and_then(port_of)
            .filter(|port| *port != 0)
            .unwrap_or(DEFAULT_PORT);

        let mut last_error = None;
        for addr in (host, port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(_) => return Ok(()),
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no address for {}", host))
        }))
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}

impl Connector for TcpProbe {
    fn connect(&mut self, role: ConnectionRole, params: &ConnectionParams) -> bool {
        let Some(server) = params.server.as_ref() else {
            return false;
        };

        let hide_errors = server
            .get("hide_connection_errors")
            .map_or(false, |value| !is_empty_value(value));

        match self.probe(server) {
            Ok(()) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    role = %role,
                    host = ?server.get("host"),
                    "Server reachable"
                );
                true
            }
            Err(error) if hide_errors => {
                tracing::debug!(target: TRACING_TARGET, role = %role, error = %error, "Connection failed");
                false
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    role = %role,
                    host = ?server.get("host"),
                    error = %error,
                    "Connection failed"
                );
                false
            }
        }
    }
}

fn port_of(value: &Value) -> Option<u16> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|port| u16::try_from(port).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
