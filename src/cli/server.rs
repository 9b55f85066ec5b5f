//! Команды управления серверами

use std::path::Path;

use colored::Colorize;
use serde_json::{json, Value};

use crate::config::{self, Server, DEFAULT_PORT};
use crate::error::{RegistryError, Result};
use crate::record::{RawConfig, ValidatedRecord};
use crate::store::ServerRegistry;

/// Добавить новый сервер
pub fn add(path: &Path, host: &str, port: Option<u16>, user: &str, password: &str) -> Result<()> {
    let mut registry_config = config::load_config(path)?;

    let mut server_config = RawConfig::new();
    server_config.insert("host".into(), Value::String(host.to_string()));
    server_config.insert("port".into(), json!(port.unwrap_or(DEFAULT_PORT)));
    server_config.insert("creds".into(), json!({ "user": user, "password": password }));

    // Не записывать в файл то, что реестр не примет
    let server = Server::from_config(&server_config)?;

    registry_config.servers.push(server_config);
    config::save_config(path, &registry_config)?;

    println!(
        "{} Сервер [{}] {} добавлен!",
        "Успех:".green().bold(),
        registry_config.servers.len(),
        server.connection_string()
    );

    Ok(())
}

/// Удалить сервер по индексу
pub fn remove(path: &Path, index: usize) -> Result<()> {
    let mut registry_config = config::load_config(path)?;

    let mut registry = ServerRegistry::from_config(&registry_config)?;
    if registry.is_empty() {
        return Err(RegistryError::NoServersConfigured);
    }

    let removed = registry.remove_server(index)?;

    // В файл возвращаются исходные записи оставшихся серверов
    registry_config.servers = registry
        .servers()
        .iter()
        .map(|server| server.raw_config().clone())
        .collect();
    config::save_config(path, &registry_config)?;

    println!(
        "{} Сервер [{}] {} удалён.",
        "Успех:".green().bold(),
        index.max(1),
        removed.connection_string()
    );

    Ok(())
}
