//! Shared "current server settings" slot

use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use crate::record::RawConfig;

/// The effective configuration of the current server, shared with the
/// parts of the system that read it. Last writer wins.
#[derive(Debug, Clone, Default)]
pub struct CurrentServerSettings {
    inner: Arc<RwLock<RawConfig>>,
}

impl CurrentServerSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the slot
    pub fn get(&self) -> RawConfig {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn value(&self, key: &str) -> Option<Value> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn set(&self, config: RawConfig) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = config;
    }
}
