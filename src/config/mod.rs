//! Server configuration entities and the configuration file
//!
//! Handles:
//! - Credentials and server definitions built from raw mappings
//! - Derived per-server settings
//! - Loading and saving the registry configuration file

mod credentials;
mod server;
mod settings;
mod storage;

pub use credentials::Credentials;
pub use server::{Server, DEFAULT_PORT};
pub use settings::ServerSettings;
pub use storage::{default_config_path, load_config, save_config, RegistryConfig, CONFIG_ENV};
