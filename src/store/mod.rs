//! Per-session stores and the server registry
//!
//! A [`Stores`] container is the session context: it holds at most one
//! instance of each store type and creates it on first access. It is
//! passed explicitly to whatever needs server resolution.

mod params;
mod server_store;
mod slot;

use std::any::{Any, TypeId};
use std::collections::HashMap;

pub use params::{
    control_params, fallback_params, redacted, user_params, ConnectionParams, ConnectionRole,
    CONTROL_PREFIX, SHARED_TRANSPORT_SETTINGS,
};
pub use server_store::ServerRegistry;
pub use slot::CurrentServerSettings;

pub const TRACING_TARGET: &str = "server_registry::store";

/// A store that can be created lazily inside a [`Stores`] container
pub trait Store: Any + Send {
    fn create() -> Self
    where
        Self: Sized;
}

/// Lazily created store instances, one per store type
#[derive(Default)]
pub struct Stores {
    instances: HashMap<TypeId, Box<dyn Any + Send>>,
}

impl Stores {
    pub fn new() -> Self {
        Self::default()
    }

    /// The instance of `T`, created on first access
    pub fn instance<T: Store>(&mut self) -> &mut T {
        self.instances
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                tracing::debug!(
                    target: TRACING_TARGET,
                    store = std::any::type_name::<T>(),
                    "Creating store"
                );
                Box::new(T::create()) as Box<dyn Any + Send>
            })
            .downcast_mut::<T>()
            .expect("store instances are keyed by their own TypeId")
    }

    /// The instance of `T` if it has been created
    pub fn get<T: Store>(&self) -> Option<&T> {
        self.instances
            .get(&TypeId::of::<T>())
            .and_then(|instance| instance.downcast_ref::<T>())
    }

    pub fn contains<T: Store>(&self) -> bool {
        self.instances.contains_key(&TypeId::of::<T>())
    }

    /// Drop every instance; the next access creates fresh ones
    pub fn clear(&mut self) {
        self.instances.clear();
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores")
            .field("instances", &self.instances.len())
            .finish()
    }
}
