//! Server definition

use serde_json::{json, Value};

use super::{Credentials, ServerSettings};
use crate::error::Result;
use crate::record::{
    backfill, merge_into, value_to_port, value_to_string, FieldSpec, RawConfig, TypedRecord,
    ValidatedRecord,
};

/// Port used when a server does not set one
pub const DEFAULT_PORT: u16 = 3306;

const SCHEMA: &[FieldSpec] = &[
    FieldSpec::plain("host"),
    FieldSpec::plain("port"),
    FieldSpec::record("creds"),
];

/// A single configured database server.
///
/// Built once from a raw mapping and never changed afterwards. `host` and
/// `creds` are guaranteed to be present.
#[derive(Debug, Clone)]
pub struct Server {
    host: String,
    port: u16,
    creds: Credentials,
    config: RawConfig,
    settings: ServerSettings,
}

impl Server {
    /// Create a server definition from its essential parts
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let mut creds = RawConfig::new();
        creds.insert("user".into(), Value::String(user.into()));
        creds.insert("password".into(), Value::String(password.into()));

        let mut config = RawConfig::new();
        config.insert("host".into(), Value::String(host.into()));
        config.insert("port".into(), json!(port));
        config.insert("creds".into(), Value::Object(creds));

        Self::from_config(&config)
    }

    /// Host name or address
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port, 3306 unless configured
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Login credentials
    pub fn creds(&self) -> &Credentials {
        &self.creds
    }

    /// The mapping this server was built from
    pub fn raw_config(&self) -> &RawConfig {
        &self.config
    }

    /// Settings derived from the raw mapping
    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    /// Get the connection string (user@host:port)
    pub fn connection_string(&self) -> String {
        if self.port == DEFAULT_PORT {
            format!("{}@{}", self.creds.user(), self.host)
        } else {
            format!("{}@{}:{}", self.creds.user(), self.host, self.port)
        }
    }

    /// The server's own merged configuration: derived settings, then the
    /// raw mapping, then the typed host/port and the credentials. Settings
    /// that the merge left empty fall back to their derived value.
    pub fn get_config(&self) -> RawConfig {
        let settings = self.settings.to_map();

        let mut config = settings.clone();
        merge_into(&mut config, &self.config);
        config.remove("creds");
        config.insert("host".into(), json!(self.host));
        config.insert("port".into(), json!(self.port));
        merge_into(&mut config, &self.creds.to_map());

        backfill(&mut config, &settings);
        config
    }
}

impl TypedRecord for Server {
    const NAME: &'static str = "Server";

    fn schema() -> &'static [FieldSpec] {
        SCHEMA
    }

    fn blank() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            creds: Credentials::blank(),
            config: RawConfig::new(),
            settings: ServerSettings::default(),
        }
    }

    fn assign(&mut self, field: &'static str, value: Value) -> Result<()> {
        match field {
            "host" => self.host = value_to_string(Self::NAME, field, &value)?,
            "port" => self.port = value_to_port(Self::NAME, field, &value)?,
            "creds" => self.creds = Credentials::cast(&value)?,
            _ => {}
        }
        Ok(())
    }

    fn to_map(&self) -> RawConfig {
        let mut map = RawConfig::new();
        map.insert("host".into(), json!(self.host));
        map.insert("port".into(), json!(self.port));
        map.insert("creds".into(), Value::Object(self.creds.to_map()));
        map
    }

    fn construct(data: &RawConfig) -> Result<Self> {
        Self::from_config(data)
    }
}

impl ValidatedRecord for Server {
    fn required_fields() -> &'static [&'static str] {
        &["host", "creds"]
    }

    fn setup(&mut self, data: &RawConfig) -> Result<()> {
        self.fill(data)?;
        self.settings = ServerSettings::from_raw(data);
        self.config = data.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;

    fn raw(value: Value) -> RawConfig {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_server_from_config() {
        let server = Server::from_config(&raw(json!({
            "host": "db1",
            "creds": {"user": "root", "password": "pw"},
        })))
        .unwrap();

        assert_eq!(server.host(), "db1");
        assert_eq!(server.port(), DEFAULT_PORT);
        assert_eq!(server.creds().user(), "root");

        let config = server.get_config();
        assert_eq!(config["host"], json!("db1"));
        assert_eq!(config["port"], json!(3306));
        assert_eq!(config["user"], json!("root"));
        assert_eq!(config["password"], json!("pw"));
        assert!(!config.contains_key("creds"));
    }

    #[test]
    fn test_missing_host() {
        let err = Server::from_config(&raw(json!({"creds": {"user": "u", "password": "p"}})))
            .unwrap_err();
        assert_eq!(err.to_string(), "Server config should contain host setting");
    }

    #[test]
    fn test_missing_creds() {
        let err = Server::from_config(&raw(json!({"host": "db1"}))).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::MissingField {
                record: "Server",
                field: "creds"
            }
        ));
    }

    #[test]
    fn test_incomplete_creds() {
        let err = Server::from_config(&raw(json!({"host": "db1", "creds": {"user": "u"}})))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::MissingField {
                record: "Credentials",
                field: "password"
            }
        ));
    }

    #[test]
    fn test_creds_from_json_string() {
        let server = Server::from_config(&raw(json!({
            "host": "db1",
            "creds": "{\"user\": \"u\", \"password\": \"p\"}",
        })))
        .unwrap();
        assert_eq!(server.creds().password(), "p");
    }

    #[test]
    fn test_port_from_string() {
        let server = Server::from_config(&raw(json!({
            "host": "db1",
            "port": "3307",
            "creds": {"user": "u", "password": "p"},
        })))
        .unwrap();
        assert_eq!(server.port(), 3307);
        assert_eq!(server.get_config()["port"], json!(3307));
        assert_eq!(server.connection_string(), "u@db1:3307");
    }

    #[test]
    fn test_invalid_port() {
        let err = Server::from_config(&raw(json!({
            "host": "db1",
            "port": "high",
            "creds": {"user": "u", "password": "p"},
        })))
        .unwrap_err();
        assert!(matches!(err, RegistryError::Cast { field: "port", .. }));
    }

    #[test]
    fn test_get_config_keeps_raw_overrides() {
        let server = Server::from_config(&raw(json!({
            "host": "db1",
            "creds": {"user": "u", "password": "p"},
            "socket": "/tmp/s.sock",
            "ssl": true,
            "extra": "kept",
        })))
        .unwrap();

        let config = server.get_config();
        assert_eq!(config["socket"], json!("/tmp/s.sock"));
        assert_eq!(config["ssl"], json!(true));
        assert_eq!(config["extra"], json!("kept"));
        assert_eq!(config["ssl_verify"], json!(true));
    }

    #[test]
    fn test_get_config_backfills_empty_override() {
        let server = Server::from_config(&raw(json!({
            "host": "db1",
            "creds": {"user": "u", "password": "p"},
            "auth_type": null,
        })))
        .unwrap();

        assert_eq!(server.get_config()["auth_type"], json!("cookie"));
    }

    #[test]
    fn test_to_json() {
        let server = Server::new("db1", 3306, "u", "p").unwrap();
        let decoded: Value = serde_json::from_str(&server.to_json().unwrap()).unwrap();
        assert_eq!(
            decoded,
            json!({"host": "db1", "port": 3306, "creds": {"user": "u", "password": "p"}})
        );
        assert_eq!(server.connection_string(), "u@db1");
    }
}
