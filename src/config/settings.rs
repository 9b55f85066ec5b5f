//! Built-in per-server settings

use serde::Serialize;
use serde_json::Value;

use crate::record::{is_empty_value, RawConfig};

/// The derived settings of one server: built-in defaults overridden by
/// whatever the raw server mapping sets with a usable type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerSettings {
    pub socket: String,
    pub ssl: bool,
    pub ssl_key: Option<String>,
    pub ssl_cert: Option<String>,
    pub ssl_ca: Option<String>,
    pub ssl_ca_path: Option<String>,
    pub ssl_ciphers: Option<String>,
    pub ssl_verify: bool,
    pub compress: bool,
    pub controlhost: String,
    pub controlport: String,
    pub controluser: String,
    pub controlpass: String,
    pub auth_type: String,
    pub hide_connection_errors: bool,
    pub only_db: String,
    pub verbose: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            socket: String::new(),
            ssl: false,
            ssl_key: None,
            ssl_cert: None,
            ssl_ca: None,
            ssl_ca_path: None,
            ssl_ciphers: None,
            ssl_verify: true,
            compress: false,
            controlhost: String::new(),
            controlport: String::new(),
            controluser: String::new(),
            controlpass: String::new(),
            auth_type: "cookie".to_string(),
            hide_connection_errors: false,
            only_db: String::new(),
            verbose: String::new(),
        }
    }
}

impl ServerSettings {
    /// Merge the built-in defaults with a raw server mapping
    pub fn from_raw(raw: &RawConfig) -> Self {
        let mut settings = Self::default();

        override_string(raw, "socket", &mut settings.socket);
        override_bool(raw, "ssl", &mut settings.ssl);
        override_optional(raw, "ssl_key", &mut settings.ssl_key);
        override_optional(raw, "ssl_cert", &mut settings.ssl_cert);
        override_optional(raw, "ssl_ca", &mut settings.ssl_ca);
        override_optional(raw, "ssl_ca_path", &mut settings.ssl_ca_path);
        override_optional(raw, "ssl_ciphers", &mut settings.ssl_ciphers);
        override_bool(raw, "ssl_verify", &mut settings.ssl_verify);
        override_bool(raw, "compress", &mut settings.compress);
        override_string(raw, "controlhost", &mut settings.controlhost);
        override_string(raw, "controlport", &mut settings.controlport);
        override_string(raw, "controluser", &mut settings.controluser);
        override_string(raw, "controlpass", &mut settings.controlpass);
        override_string(raw, "auth_type", &mut settings.auth_type);
        override_bool(raw, "hide_connection_errors", &mut settings.hide_connection_errors);
        override_string(raw, "only_db", &mut settings.only_db);
        override_string(raw, "verbose", &mut settings.verbose);

        settings
    }

    /// Every setting as an untyped mapping
    pub fn to_map(&self) -> RawConfig {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => RawConfig::new(),
        }
    }
}

fn override_string(raw: &RawConfig, key: &str, slot: &mut String) {
    match raw.get(key) {
        Some(Value::String(text)) => *slot = text.clone(),
        Some(Value::Number(number)) => *slot = number.to_string(),
        _ => {}
    }
}

fn override_optional(raw: &RawConfig, key: &str, slot: &mut Option<String>) {
    match raw.get(key) {
        Some(Value::String(text)) => *slot = Some(text.clone()),
        Some(Value::Null) => *slot = None,
        _ => {}
    }
}

fn override_bool(raw: &RawConfig, key: &str, slot: &mut bool) {
    match raw.get(key) {
        Some(value @ (Value::Bool(_) | Value::Number(_) | Value::String(_))) => {
            *slot = !is_empty_value(value)
        }
        _ => {}
    }
}
