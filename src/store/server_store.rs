//! Registry of configured servers and the current selection

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use super::params::{control_params, fallback_params, user_params};
use super::{ConnectionParams, ConnectionRole, CurrentServerSettings, Store, TRACING_TARGET};
use crate::config::{RegistryConfig, Server};
use crate::connect::Connector;
use crate::error::{RegistryError, Result};
use crate::record::{backfill, is_missing, merge_into, RawConfig, ValidatedRecord};

/// The configured servers of a session, which one is current, and how
/// connection parameters are resolved for it.
///
/// Servers are addressed by 1-based index; index 0 is an alias of the
/// first server.
pub struct ServerRegistry {
    servers: Vec<Server>,
    current_index: Option<usize>,
    defaults: RawConfig,
    settings: CurrentServerSettings,
    connector: Option<Box<dyn Connector>>,
}

impl ServerRegistry {
    /// Create an empty registry with no global server defaults
    pub fn new() -> Self {
        Self::with_defaults(RawConfig::new())
    }

    /// Create an empty registry with the given global server defaults
    pub fn with_defaults(defaults: RawConfig) -> Self {
        Self {
            servers: Vec::new(),
            current_index: None,
            defaults,
            settings: CurrentServerSettings::new(),
            connector: None,
        }
    }

    /// Build a registry from a loaded configuration file
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let mut registry = Self::new();
        registry.bootstrap(config)?;
        Ok(registry)
    }

    /// Build a registry from raw server mappings
    pub fn from_servers_config(servers_config: &[RawConfig]) -> Result<Self> {
        let mut registry = Self::new();
        registry.reset_servers_config(servers_config)?;
        Ok(registry)
    }

    /// Install the global defaults and the server list of a configuration.
    /// Every server entry is validated first; on error neither the defaults
    /// nor the servers change.
    pub fn bootstrap(&mut self, config: &RegistryConfig) -> Result<()> {
        let servers = build_servers(&config.servers)?;
        self.defaults = config.defaults.clone();
        self.install_servers(servers)
    }

    /// Use this connector for the connection attempted on every selection
    pub fn attach_connector(&mut self, connector: impl Connector + 'static) {
        self.connector = Some(Box::new(connector));
    }

    /// Handle to the shared current-server settings slot
    pub fn settings_slot(&self) -> CurrentServerSettings {
        self.settings.clone()
    }

    /// All servers in index order
    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    /// Number of configured servers
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Check if no server is configured
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Look up a server by 1-based index (0 means the first server)
    pub fn find_server_by_index(&self, index: usize) -> Option<&Server> {
        if self.servers.is_empty() {
            return None;
        }

        self.servers.get(index.saturating_sub(1))
    }

    /// 1-based index of the first server with exactly this host
    pub fn find_server_index_by_host(&self, host: &str) -> Option<usize> {
        self.servers
            .iter()
            .position(|server| server.host() == host)
            .map(|position| position + 1)
    }

    /// Index of the first server, if any
    pub fn get_first_index(&self) -> Option<usize> {
        if self.servers.is_empty() {
            None
        } else {
            Some(1)
        }
    }

    /// 1-based index of the current server
    pub fn current_server_index(&self) -> Option<usize> {
        self.current_index
    }

    /// The current server, if one is selected
    pub fn current_server(&self) -> Option<&Server> {
        self.current_index
            .and_then(|index| self.find_server_by_index(index))
    }

    /// Change the current server.
    ///
    /// `None` clears the selection and returns `Ok(None)`. Otherwise the
    /// server becomes current, its effective configuration is written to
    /// the settings slot and a user connection is attempted; the result
    /// tells whether it succeeded, or is `None` without a connector.
    /// An unknown index leaves the selection untouched.
    pub fn set_current_server_index(&mut self, index: Option<usize>) -> Result<Option<bool>> {
        let Some(index) = index else {
            tracing::debug!(target: TRACING_TARGET, "Current server cleared");
            self.current_index = None;
            return Ok(None);
        };

        if self.find_server_by_index(index).is_none() {
            let error = RegistryError::MissingServerIndex(index);
            tracing::error!(target: TRACING_TARGET, error = %error, "Server selection failed");
            return Err(error);
        }

        let index = index.max(1);
        self.current_index = Some(index);

        tracing::debug!(
            target: TRACING_TARGET,
            index,
            host = self.current_server().map(Server::host),
            "Current server selected"
        );

        let config = self.update_current_server_global_data();
        Ok(self.redeclare_connect(&config))
    }

    /// Make the server at this index current
    pub fn set_current_server_by_index(&mut self, index: usize) -> Result<Option<bool>> {
        self.set_current_server_index(Some(index))
    }

    /// Make the first server with this host current
    pub fn set_current_server_by_host(&mut self, host: &str) -> Result<Option<bool>> {
        let Some(index) = self.find_server_index_by_host(host) else {
            let error = RegistryError::MissingServerHost(host.to_string());
            tracing::error!(target: TRACING_TARGET, error = %error, "Server selection failed");
            return Err(error);
        };

        self.set_current_server_index(Some(index))
    }

    /// Try each server in index order and keep the first one whose
    /// connection succeeds. Returns its index.
    pub fn set_current_server_by_default(&mut self) -> Option<usize> {
        for index in 1..=self.servers.len() {
            if let Ok(Some(true)) = self.set_current_server_index(Some(index)) {
                tracing::info!(
                    target: TRACING_TARGET,
                    index,
                    host = self.current_server().map(Server::host),
                    "Connected to default server"
                );
                return Some(index);
            }
        }

        tracing::warn!(
            target: TRACING_TARGET,
            servers = self.servers.len(),
            "No server accepted a connection"
        );
        None
    }

    /// Replace the whole server list. Every entry is validated before the
    /// registry changes; on error the registry is left as it was.
    pub fn reset_servers_config(&mut self, servers_config: &[RawConfig]) -> Result<()> {
        let servers = build_servers(servers_config)?;
        self.install_servers(servers)
    }

    fn install_servers(&mut self, servers: Vec<Server>) -> Result<()> {
        self.set_defaults();
        for server in servers {
            self.add_server(server)?;
        }

        tracing::info!(
            target: TRACING_TARGET,
            servers = self.servers.len(),
            current = self.current_index,
            "Server registry reset"
        );
        Ok(())
    }

    /// Drop every server and the current selection
    pub fn set_defaults(&mut self) {
        self.servers.clear();
        self.current_index = None;
    }

    /// Append a server from its raw mapping. Returns its index.
    pub fn add_server_config(&mut self, server_config: &RawConfig) -> Result<usize> {
        let server = Server::from_config(server_config)?;
        self.add_server(server)
    }

    /// Append a server. The first server added to an empty selection
    /// becomes current.
    pub fn add_server(&mut self, server: Server) -> Result<usize> {
        self.servers.push(server);
        let index = self.servers.len();

        if self.current_index.is_none() {
            self.set_current_server_index(self.get_first_index())?;
        }

        Ok(index)
    }

    /// Remove a server by index. Later servers move down one index; if the
    /// current server is removed the first remaining server becomes current.
    pub fn remove_server(&mut self, index: usize) -> Result<Server> {
        if self.find_server_by_index(index).is_none() {
            return Err(RegistryError::MissingServerIndex(index));
        }

        let index = index.max(1);
        let removed = self.servers.remove(index - 1);

        match self.current_index {
            Some(current) if current == index => {
                self.current_index = None;
                self.set_current_server_index(self.get_first_index())?;
            }
            Some(current) if current > index => self.current_index = Some(current - 1),
            _ => {}
        }

        tracing::info!(
            target: TRACING_TARGET,
            index,
            host = removed.host(),
            "Server removed"
        );
        Ok(removed)
    }

    /// The process-wide server baseline with its normalized keys
    pub fn global_server_config(&self) -> RawConfig {
        let mut server = self.defaults.clone();

        let port = if is_missing(&server, "port") {
            0
        } else {
            server.get("port").map_or(0, integer_of)
        };
        server.insert("port".into(), Value::from(port));

        if is_missing(&server, "socket") {
            server.insert("socket".into(), Value::Null);
        }

        if is_missing(&server, "host") {
            server.insert("host".into(), Value::String("localhost".into()));
        }

        for key in ["ssl", "compress", "hide_connection_errors"] {
            if server.get(key).map_or(true, Value::is_null) {
                server.insert(key.into(), Value::Bool(false));
            }
        }

        server
    }

    /// Effective configuration of a server. The simple form skips the
    /// global baseline and its backfilling.
    pub fn get_server_config(&self, server: Option<&Server>, simple: bool) -> RawConfig {
        let baseline = if simple {
            RawConfig::new()
        } else {
            self.global_server_config()
        };

        let Some(server) = server else {
            return baseline;
        };

        let mut config = baseline.clone();
        merge_into(&mut config, &server.get_config());
        backfill(&mut config, &baseline);
        config
    }

    /// Effective configuration of the current server
    pub fn current_server_config(&self, simple: bool) -> RawConfig {
        self.get_server_config(self.current_server(), simple)
    }

    /// Effective configuration of every server in index order
    pub fn all_servers_config(&self) -> Vec<RawConfig> {
        self.servers
            .iter()
            .map(|server| self.get_server_config(Some(server), false))
            .collect()
    }

    /// Effective configuration of every server keyed by 1-based index
    pub fn all_servers(&self) -> BTreeMap<usize, RawConfig> {
        self.all_servers_config()
            .into_iter()
            .enumerate()
            .map(|(position, config)| (position + 1, config))
            .collect()
    }

    /// Write the current server's effective configuration to the settings slot
    pub fn update_current_server_global_data(&self) -> RawConfig {
        let config = self.current_server_config(false);
        self.settings.set(config.clone());
        config
    }

    /// Connection parameters of the current server for a role. Roles other
    /// than user and control resolve from the explicit `server` mapping.
    pub fn get_current_server_connection_params(
        &self,
        role: ConnectionRole,
        server: Option<&RawConfig>,
    ) -> ConnectionParams {
        let config = self.update_current_server_global_data();

        match role {
            ConnectionRole::User => user_params(&config),
            ConnectionRole::Control => control_params(&config),
            ConnectionRole::Auxiliary => fallback_params(server),
        }
    }

    fn redeclare_connect(&mut self, config: &RawConfig) -> Option<bool> {
        let connector = self.connector.as_mut()?;

        let connected = connector.connect(ConnectionRole::User, &user_params(config));
        if !connected {
            tracing::debug!(
                target: TRACING_TARGET,
                index = self.current_index,
                "User connection to current server failed"
            );
        }

        Some(connected)
    }
}

impl Default for ServerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for ServerRegistry {
    fn create() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ServerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerRegistry")
            .field("servers", &self.servers)
            .field("current_index", &self.current_index)
            .field("defaults", &self.defaults.keys().collect::<Vec<_>>())
            .field("connector", &self.connector.is_some())
            .finish()
    }
}

fn build_servers(servers_config: &[RawConfig]) -> Result<Vec<Server>> {
    servers_config.iter().map(Server::from_config).collect()
}

/// Integer value of a setting; non-numeric values count as 0
fn integer_of(value: &Value) -> i64 {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|n| n as i64))
            .unwrap_or(0),
        Value::String(text) => leading_integer(text),
        Value::Bool(flag) => i64::from(*flag),
        _ => 0,
    }
}

/// Integer formed by the leading digits of a string ("3310abc" is 3310)
fn leading_integer(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let value = rest[..digits].parse::<i64>().unwrap_or(0);

    if negative {
        -value
    } else {
        value
    }
}
