//! Records that refuse construction without their required fields

use super::{is_missing, RawConfig, TypedRecord, TRACING_TARGET};
use crate::error::{RegistryError, Result};

/// A [`TypedRecord`] validated at construction time.
///
/// Implementors route [`TypedRecord::construct`] to [`ValidatedRecord::from_config`]
/// so that casting a raw value into a nested validated record runs the
/// nested type's own checks instead of a bare fill.
pub trait ValidatedRecord: TypedRecord {
    /// Fields that must be present and non-empty in the raw mapping
    fn required_fields() -> &'static [&'static str];

    fn validate(data: &RawConfig) -> Result<()> {
        for &field in Self::required_fields() {
            if is_missing(data, field) {
                let error = RegistryError::MissingField {
                    record: Self::NAME,
                    field,
                };
                tracing::error!(target: TRACING_TARGET, error = %error, "Invalid record config");
                return Err(error);
            }
        }

        Ok(())
    }

    /// Populate a blank instance. Records holding derived state extend this.
    fn setup(&mut self, data: &RawConfig) -> Result<()> {
        self.fill(data)?;
        Ok(())
    }

    /// Validating constructor
    fn from_config(data: &RawConfig) -> Result<Self> {
        Self::validate(data)?;
        let mut record = Self::blank();
        record.setup(data)?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::record::{value_to_string, FieldSpec};

    #[derive(Debug)]
    struct Endpoint {
        url: String,
        auth: Option<Token>,
    }

    #[derive(Debug)]
    struct Token {
        secret: String,
    }

    const ENDPOINT_SCHEMA: &[FieldSpec] = &[FieldSpec::plain("url"), FieldSpec::record("auth")];
    const TOKEN_SCHEMA: &[FieldSpec] = &[FieldSpec::plain("secret")];

    impl TypedRecord for Endpoint {
        const NAME: &'static str = "Endpoint";

        fn schema() -> &'static [FieldSpec] {
            ENDPOINT_SCHEMA
        }

        fn blank() -> Self {
            Self {
                url: String::new(),
                auth: None,
            }
        }

        fn assign(&mut self, field: &'static str, value: Value) -> Result<()> {
            match field {
                "url" => self.url = value_to_string(Self::NAME, field, &value)?,
                "auth" => self.auth = Some(Token::cast(&value)?),
                _ => {}
            }
            Ok(())
        }

        fn to_map(&self) -> RawConfig {
            let mut map = RawConfig::new();
            map.insert("url".into(), json!(self.url));
            map
        }

        fn construct(data: &RawConfig) -> Result<Self> {
            Self::from_config(data)
        }
    }

    impl ValidatedRecord for Endpoint {
        fn required_fields() -> &'static [&'static str] {
            &["url"]
        }
    }

    impl TypedRecord for Token {
        const NAME: &'static str = "Token";

        fn schema() -> &'static [FieldSpec] {
            TOKEN_SCHEMA
        }

        fn blank() -> Self {
            Self {
                secret: String::new(),
            }
        }

        fn assign(&mut self, field: &'static str, value: Value) -> Result<()> {
            if field == "secret" {
                self.secret = value_to_string(Self::NAME, field, &value)?;
            }
            Ok(())
        }

        fn to_map(&self) -> RawConfig {
            RawConfig::new()
        }

        fn construct(data: &RawConfig) -> Result<Self> {
            Self::from_config(data)
        }
    }

    impl ValidatedRecord for Token {
        fn required_fields() -> &'static [&'static str] {
            &["secret"]
        }
    }

    fn raw(value: Value) -> RawConfig {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_missing_required_field() {
        let err = Endpoint::from_config(&raw(json!({}))).unwrap_err();
        assert_eq!(err.to_string(), "Endpoint config should contain url setting");
    }

    #[test]
    fn test_empty_required_field_counts_as_missing() {
        assert!(Endpoint::from_config(&raw(json!({"url": ""}))).is_err());
        assert!(Endpoint::from_config(&raw(json!({"url": []}))).is_err());
    }

    #[test]
    fn test_nested_cast_runs_nested_validation() {
        let err = Endpoint::from_config(&raw(json!({"url": "x", "auth": {"other": 1}}))).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::MissingField {
                record: "Token",
                field: "secret"
            }
        ));
    }

    #[test]
    fn test_nested_cast_accepts_json_encoded_mapping() {
        let endpoint =
            Endpoint::from_config(&raw(json!({"url": "x", "auth": "{\"secret\": \"s3\"}"}))).unwrap();
        assert_eq!(endpoint.auth.unwrap().secret, "s3");
    }
}
