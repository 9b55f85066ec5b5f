//! Connection parameters per connection role

use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::error::RegistryError;
use crate::record::{is_empty_value, is_missing, RawConfig};

/// Transport settings bound to a host. The control connection inherits
/// them only when it targets the same host as the user connection.
pub const SHARED_TRANSPORT_SETTINGS: &[&str] = &[
    "socket",
    "compress",
    "ssl",
    "ssl_key",
    "ssl_cert",
    "ssl_ca",
    "ssl_ca_path",
    "ssl_ciphers",
    "ssl_verify",
];

/// Keys with this prefix override control connection settings
pub const CONTROL_PREFIX: &str = "control_";

/// Configuration keys holding secrets
const SECRET_KEYS: &[&str] = &["password", "controlpass", "control_password"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionRole {
    /// The operator's own connection
    User,
    /// The privileged connection used for administrative queries
    Control,
    /// Any other connection
    Auxiliary,
}

impl fmt::Display for ConnectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionRole::User => write!(f, "user"),
            ConnectionRole::Control => write!(f, "control"),
            ConnectionRole::Auxiliary => write!(f, "auxiliary"),
        }
    }
}

impl FromStr for ConnectionRole {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(ConnectionRole::User),
            "control" => Ok(ConnectionRole::Control),
            "auxiliary" => Ok(ConnectionRole::Auxiliary),
            other => Err(RegistryError::InvalidConfig(format!(
                "unknown connection role '{}'",
                other
            ))),
        }
    }
}

/// The (user, password, server) triple handed to the connection component
#[derive(Debug, Clone, Default)]
pub struct ConnectionParams {
    pub user: Option<String>,
    pub password: Option<SecretString>,
    pub server: Option<RawConfig>,
}

impl ConnectionParams {
    pub fn password(&self) -> Option<&str> {
        self.password.as_ref().map(|secret| secret.expose_secret().as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.password.is_none() && self.server.is_none()
    }
}

/// Parameters of the user connection: the effective config as-is
pub fn user_params(config: &RawConfig) -> ConnectionParams {
    ConnectionParams {
        user: string_value(config, "user"),
        password: string_value(config, "password").map(SecretString::new),
        server: Some(config.clone()),
    }
}

/// Parameters of the control connection, reduced from the effective config
pub fn control_params(config: &RawConfig) -> ConnectionParams {
    let mut server = RawConfig::new();

    server.insert(
        "hide_connection_errors".into(),
        config
            .get("hide_connection_errors")
            .cloned()
            .unwrap_or(Value::Bool(false)),
    );

    let (host_key, port_key) = if is_missing(config, "controlhost") {
        ("host", "port")
    } else {
        ("controlhost", "controlport")
    };

    server.insert(
        "host".into(),
        config.get(host_key).cloned().unwrap_or(Value::Null),
    );
    if let Some(port) = config.get(port_key).filter(|port| !is_empty_value(port)) {
        server.insert("port".into(), port.clone());
    }

    let main_host = config.get("host").unwrap_or(&Value::Null);
    if server.get("host") == Some(main_host) {
        for &key in SHARED_TRANSPORT_SETTINGS {
            if let Some(value) = config.get(key).filter(|value| !value.is_null()) {
                server.insert(key.into(), value.clone());
            }
        }
    }

    for (key, value) in config {
        if let Some(stripped) = key.strip_prefix(CONTROL_PREFIX) {
            server.insert(stripped.into(), value.clone());
        }
    }

    ConnectionParams {
        user: string_value(config, "controluser"),
        password: string_value(config, "controlpass").map(SecretString::new),
        server: Some(server),
    }
}

/// Parameters for any other role: taken from an explicit server mapping
pub fn fallback_params(server: Option<&RawConfig>) -> ConnectionParams {
    match server {
        None => ConnectionParams::default(),
        Some(server) => ConnectionParams {
            user: string_value(server, "user"),
            password: string_value(server, "password").map(SecretString::new),
            server: Some(server.clone()),
        },
    }
}

/// Copy of a configuration with secret values masked
pub fn redacted(config: &RawConfig) -> RawConfig {
    let mut copy = config.clone();
    for &key in SECRET_KEYS {
        if let Some(value) = copy.get_mut(key) {
            if !value.is_null() {
                *value = Value::String("********".into());
            }
        }
    }
    copy
}

fn string_value(config: &RawConfig, key: &str) -> Option<String> {
    match config.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
