//! Typed records filled from untyped configuration mappings
//!
//! A record declares its fields in a static schema table. The generic
//! [`TypedRecord::fill`] walks that table, normalizes each raw value
//! according to the field's [`Cast`], skips nulls for non-nullable fields
//! and hands the result to the record's own `assign`. Unknown keys in the
//! input are ignored.

mod validated;

use serde_json::{Map, Value};

use crate::error::{RegistryError, Result};

pub use validated::ValidatedRecord;

pub const TRACING_TARGET: &str = "server_registry::record";

/// Untyped configuration mapping
pub type RawConfig = Map<String, Value>;

/// How a raw value is transformed before assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cast {
    /// Assigned as-is
    Plain,
    /// A sub-mapping, or its JSON encoding, interpreted as a nested record
    Record,
    /// A sequence whose elements are sub-mappings for a nested record
    RecordList,
}

/// One entry of a record's schema table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub cast: Cast,
    pub nullable: bool,
}

impl FieldSpec {
    pub const fn plain(name: &'static str) -> Self {
        Self {
            name,
            cast: Cast::Plain,
            nullable: false,
        }
    }

    pub const fn record(name: &'static str) -> Self {
        Self {
            name,
            cast: Cast::Record,
            nullable: false,
        }
    }

    pub const fn record_list(name: &'static str) -> Self {
        Self {
            name,
            cast: Cast::RecordList,
            nullable: false,
        }
    }

    /// Allow `null` to be assigned to this field
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// A value object constructed from an untyped mapping
pub trait TypedRecord: Sized {
    /// Type name used in error messages
    const NAME: &'static str;

    /// Declared fields
    fn schema() -> &'static [FieldSpec];

    /// Unfilled instance used as the fill target
    fn blank() -> Self;

    /// Store an already-normalized value into the named field
    fn assign(&mut self, field: &'static str, value: Value) -> Result<()>;

    /// Every public field with its value; nested records are serialized
    fn to_map(&self) -> RawConfig;

    /// Build a fresh instance from a mapping
    fn construct(data: &RawConfig) -> Result<Self> {
        let mut record = Self::blank();
        record.fill(data)?;
        Ok(record)
    }

    /// Interpret a raw value as a nested instance of this record
    fn cast(value: &Value) -> Result<Self> {
        Self::construct(&prepare_cast_value(value))
    }

    fn fill(&mut self, data: &RawConfig) -> Result<&mut Self> {
        for spec in Self::schema() {
            let Some(raw) = data.get(spec.name) else {
                continue;
            };

            let value = match spec.cast {
                Cast::Plain => raw.clone(),
                Cast::Record => Value::Object(prepare_cast_value(raw)),
                Cast::RecordList => match raw {
                    Value::Array(items) => {
                        Value::Array(items.iter().map(normalize_list_item).collect())
                    }
                    other => other.clone(),
                },
            };

            if value.is_null() && !spec.nullable {
                continue;
            }

            if let Err(error) = self.assign(spec.name, value) {
                tracing::error!(
                    target: TRACING_TARGET,
                    record = Self::NAME,
                    field = spec.name,
                    error = %error,
                    "Failed to fill record field"
                );
                return Err(error);
            }
        }

        Ok(self)
    }

    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&Value::Object(self.to_map()))?)
    }
}

/// An element of a record list: either a constructed record or the raw
/// value that could not be interpreted as one
#[derive(Debug, Clone)]
pub enum Listed<R> {
    Record(R),
    Raw(Value),
}

impl<R: TypedRecord> Listed<R> {
    pub fn to_value(&self) -> Value {
        match self {
            Self::Record(record) => Value::Object(record.to_map()),
            Self::Raw(value) => value.clone(),
        }
    }
}

/// Cast every element of a sequence into `R`, passing through elements
/// that are not constructible. Non-sequences yield `None`.
pub fn cast_list<R: TypedRecord>(value: &Value) -> Option<Vec<Listed<R>>> {
    let Value::Array(items) = value else {
        return None;
    };

    let listed = items
        .iter()
        .map(|item| match item {
            Value::Object(map) => match R::construct(map) {
                Ok(record) => Listed::Record(record),
                Err(_) => Listed::Raw(item.clone()),
            },
            other => Listed::Raw(other.clone()),
        })
        .collect();

    Some(listed)
}

fn normalize_list_item(item: &Value) -> Value {
    match item {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed @ Value::Object(_)) => parsed,
            _ => item.clone(),
        },
        other => other.clone(),
    }
}

/// Normalize a raw value into a sub-mapping: mappings are taken as-is,
/// strings are decoded as JSON, anything else becomes an empty mapping
pub fn prepare_cast_value(value: &Value) -> RawConfig {
    match value {
        Value::Object(map) => map.clone(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => map,
            _ => RawConfig::new(),
        },
        _ => RawConfig::new(),
    }
}

/// Loose emptiness: null, false, zero, "", "0" and empty collections
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().map_or(false, |n| n == 0.0),
        Value::String(text) => text.is_empty() || text == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Whether a key is missing from the mapping or holds an empty value
pub fn is_missing(config: &RawConfig, key: &str) -> bool {
    config.get(key).map_or(true, is_empty_value)
}

/// The literal integer zero
pub fn is_integer_zero(value: &Value) -> bool {
    value.as_i64() == Some(0)
}

/// Overwrite `target` with every entry of `source`
pub fn merge_into(target: &mut RawConfig, source: &RawConfig) {
    for (key, value) in source {
        target.insert(key.clone(), value.clone());
    }
}

/// Restore baseline values the merged mapping left empty. A baseline value
/// is only restored when it is meaningful: non-empty, or the integer 0.
pub fn backfill(config: &mut RawConfig, baseline: &RawConfig) {
    for (key, value) in baseline {
        if !is_missing(config, key) {
            continue;
        }

        if !is_empty_value(value) || is_integer_zero(value) {
            config.insert(key.clone(), value.clone());
        }
    }
}

/// Read a string field, accepting numbers by their decimal form
pub fn value_to_string(record: &'static str, field: &'static str, value: &Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(RegistryError::cast(
            record,
            field,
            format!("expected a string, got {}", other),
        )),
    }
}

/// Read a port field, accepting integers and numeric strings
pub fn value_to_port(record: &'static str, field: &'static str, value: &Value) -> Result<u16> {
    let parsed = match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };

    parsed
        .and_then(|port| u16::try_from(port).ok())
        .ok_or_else(|| {
            RegistryError::cast(record, field, format!("invalid port {}", value))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Minimal record with a plain, a nullable and a list field
    #[derive(Debug, Default)]
    struct Tag {
        name: String,
        note: Option<String>,
        children: Vec<Listed<Tag>>,
    }

    const TAG_SCHEMA: &[FieldSpec] = &[
        FieldSpec::plain("name"),
        FieldSpec::plain("note").nullable(),
        FieldSpec::record_list("children"),
    ];

    impl TypedRecord for Tag {
        const NAME: &'static str = "Tag";

        fn schema() -> &'static [FieldSpec] {
            TAG_SCHEMA
        }

        fn blank() -> Self {
            Self {
                name: "untitled".to_string(),
                ..Default::default()
            }
        }

        fn assign(&mut self, field: &'static str, value: Value) -> Result<()> {
            match field {
                "name" => self.name = value_to_string(Self::NAME, field, &value)?,
                "note" => {
                    self.note = match value {
                        Value::Null => None,
                        other => Some(value_to_string(Self::NAME, field, &other)?),
                    }
                }
                "children" => {
                    if let Some(children) = cast_list::<Tag>(&value) {
                        self.children = children;
                    }
                }
                _ => {}
            }
            Ok(())
        }

        fn to_map(&self) -> RawConfig {
            let mut map = RawConfig::new();
            map.insert("name".into(), json!(self.name));
            map.insert("note".into(), json!(self.note));
            map.insert(
                "children".into(),
                Value::Array(self.children.iter().map(Listed::to_value).collect()),
            );
            map
        }
    }

    fn raw(value: Value) -> RawConfig {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_fill_ignores_unknown_keys() {
        let tag = Tag::construct(&raw(json!({"name": "db", "colour": "red"}))).unwrap();
        assert_eq!(tag.name, "db");
        assert!(!tag.to_map().contains_key("colour"));
    }

    #[test]
    fn test_null_skipped_for_non_nullable_field() {
        let tag = Tag::construct(&raw(json!({"name": null}))).unwrap();
        assert_eq!(tag.name, "untitled");
    }

    #[test]
    fn test_null_assigned_to_nullable_field() {
        let mut tag = Tag::construct(&raw(json!({"note": "x"}))).unwrap();
        tag.fill(&raw(json!({"note": null}))).unwrap();
        assert_eq!(tag.note, None);
    }

    #[test]
    fn test_list_cast_passes_through_unconstructible_items() {
        let tag = Tag::construct(&raw(json!({
            "name": "root",
            "children": [{"name": "a"}, "{\"name\": \"b\"}", 42]
        })))
        .unwrap();

        assert_eq!(tag.children.len(), 3);
        assert!(matches!(&tag.children[0], Listed::Record(child) if child.name == "a"));
        assert!(matches!(&tag.children[1], Listed::Record(child) if child.name == "b"));
        assert!(matches!(&tag.children[2], Listed::Raw(value) if value == &json!(42)));
    }

    #[test]
    fn test_to_json_serializes_nested_records() {
        let tag = Tag::construct(&raw(json!({"name": "root", "children": [{"name": "a"}]}))).unwrap();
        let decoded: Value = serde_json::from_str(&tag.to_json().unwrap()).unwrap();
        assert_eq!(decoded["children"][0]["name"], json!("a"));
        assert_eq!(decoded["children"][0]["note"], Value::Null);
    }

    #[test]
    fn test_cast_error_is_reported() {
        let result = Tag::construct(&raw(json!({"name": ["not", "a", "string"]})));
        assert!(matches!(
            result,
            Err(RegistryError::Cast { field: "name", .. })
        ));
    }

    #[test]
    fn test_prepare_cast_value() {
        assert_eq!(prepare_cast_value(&json!({"a": 1}))["a"], json!(1));
        assert_eq!(prepare_cast_value(&json!("{\"a\": 2}"))["a"], json!(2));
        assert!(prepare_cast_value(&json!("not json")).is_empty());
        assert!(prepare_cast_value(&json!(7)).is_empty());
    }

    #[test]
    fn test_is_empty_value() {
        for empty in [json!(null), json!(false), json!(0), json!(""), json!("0"), json!([]), json!({})] {
            assert!(is_empty_value(&empty), "{empty} should be empty");
        }
        for full in [json!(true), json!(1), json!("a"), json!([0]), json!({"a": 0})] {
            assert!(!is_empty_value(&full), "{full} should not be empty");
        }
    }

    #[test]
    fn test_backfill_restores_meaningful_baseline_values() {
        let mut config = raw(json!({"host": "", "port": null, "ssl": false, "user": "u"}));
        let baseline = raw(json!({"host": "localhost", "port": 0, "ssl": false, "socket": null}));

        backfill(&mut config, &baseline);

        assert_eq!(config["host"], json!("localhost"));
        assert_eq!(config["port"], json!(0));
        assert_eq!(config["ssl"], json!(false));
        assert!(!config.contains_key("socket"));
        assert_eq!(config["user"], json!("u"));
    }

    #[test]
    fn test_value_to_port() {
        assert_eq!(value_to_port("S", "port", &json!(3307)).unwrap(), 3307);
        assert_eq!(value_to_port("S", "port", &json!("3308")).unwrap(), 3308);
        assert!(value_to_port("S", "port", &json!(70000)).is_err());
        assert!(value_to_port("S", "port", &json!("abc")).is_err());
    }
}
