//! Login credentials of a server

use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

use crate::error::Result;
use crate::record::{value_to_string, FieldSpec, RawConfig, TypedRecord, ValidatedRecord};

const SCHEMA: &[FieldSpec] = &[FieldSpec::plain("user"), FieldSpec::plain("password")];

/// Username and password for a database server.
///
/// The password is held in a [`SecretString`] and never shows up in
/// `Debug` output.
#[derive(Debug, Clone)]
pub struct Credentials {
    user: String,
    password: SecretString,
}

impl Credentials {
    /// Build validated credentials
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let mut data = RawConfig::new();
        data.insert("user".into(), Value::String(user.into()));
        data.insert("password".into(), Value::String(password.into()));
        Self::from_config(&data)
    }

    /// Login name
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Expose the password for use in a connection
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl TypedRecord for Credentials {
    const NAME: &'static str = "Credentials";

    fn schema() -> &'static [FieldSpec] {
        SCHEMA
    }

    fn blank() -> Self {
        Self {
            user: String::new(),
            password: SecretString::new(String::new()),
        }
    }

    fn assign(&mut self, field: &'static str, value: Value) -> Result<()> {
        match field {
            "user" => self.user = value_to_string(Self::NAME, field, &value)?,
            "password" => {
                self.password = SecretString::new(value_to_string(Self::NAME, field, &value)?)
            }
            _ => {}
        }
        Ok(())
    }

    fn to_map(&self) -> RawConfig {
        let mut map = RawConfig::new();
        map.insert("user".into(), json!(self.user));
        map.insert("password".into(), json!(self.password.expose_secret()));
        map
    }

    fn construct(data: &RawConfig) -> Result<Self> {
        Self::from_config(data)
    }
}

impl ValidatedRecord for Credentials {
    fn required_fields() -> &'static [&'static str] {
        &["user", "password"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;

    #[test]
    fn test_credentials_new() {
        let creds = Credentials::new("admin", "s3cret").unwrap();
        assert_eq!(creds.user(), "admin");
        assert_eq!(creds.password(), "s3cret");
    }

    #[test]
    fn test_missing_password() {
        let err = Credentials::new("admin", "").unwrap_err();
        assert!(matches!(
            err,
            RegistryError::MissingField {
                field: "password",
                ..
            }
        ));
        assert_eq!(err.to_string(), "Credentials config should contain password setting");
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("admin", "s3cret").unwrap();
        let debug = format!("{:?}", creds);
        assert!(debug.contains("admin"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_to_map_exposes_fields() {
        let creds = Credentials::new("admin", "s3cret").unwrap();
        let map = creds.to_map();
        assert_eq!(map["user"], json!("admin"));
        assert_eq!(map["password"], json!("s3cret"));
        assert_eq!(map.len(), 2);
    }
}
