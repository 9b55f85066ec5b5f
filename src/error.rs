use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{record} config should contain {field} setting")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    #[error("Missing server index: {0}")]
    MissingServerIndex(usize),

    #[error("Missing server host: {0}")]
    MissingServerHost(String),

    #[error("Cannot cast {record}.{field}: {reason}")]
    Cast {
        record: &'static str,
        field: &'static str,
        reason: String,
    },

    #[error("No servers configured. Run 'server-registry server add' first.")]
    NoServersConfigured,

    #[error("No configured server accepted a connection")]
    NoServerReachable,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RegistryError {
    /// Build a cast error for a record field
    pub fn cast(record: &'static str, field: &'static str, reason: impl Into<String>) -> Self {
        Self::Cast {
            record,
            field,
            reason: reason.into(),
        }
    }

    /// Whether this error comes from a lookup rather than from validation
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::MissingServerIndex(_) | Self::MissingServerHost(_))
    }
}
