//! Реализация CLI команд

pub mod check;
pub mod connect;
pub mod list;
pub mod params;
pub mod server;
pub mod show;

use std::path::Path;

use clap::Args;
use serde_json::Value;

use crate::config;
use crate::error::{RegistryError, Result};
use crate::record::RawConfig;
use crate::store::{redacted, ServerRegistry, Stores};

/// Выбор сервера по индексу или хосту
#[derive(Debug, Clone, Default, Args)]
pub struct ServerTarget {
    /// Индекс сервера (начиная с 1)
    #[arg(long, conflicts_with = "host")]
    pub index: Option<usize>,

    /// Хост сервера
    #[arg(long)]
    pub host: Option<String>,
}

/// Загрузить конфигурацию и заполнить реестр сессии
pub fn open_registry<'a>(stores: &'a mut Stores, path: &Path) -> Result<&'a mut ServerRegistry> {
    let config = config::load_config(path)?;

    let registry = stores.instance::<ServerRegistry>();
    registry.bootstrap(&config)?;

    Ok(registry)
}

/// Сделать выбранный сервер текущим (без выбора остаётся первый)
pub fn select_target(registry: &mut ServerRegistry, target: &ServerTarget) -> Result<()> {
    if registry.is_empty() {
        return Err(RegistryError::NoServersConfigured);
    }

    match (target.index, target.host.as_deref()) {
        (Some(index), _) => registry.set_current_server_by_index(index)?,
        (None, Some(host)) => registry.set_current_server_by_host(host)?,
        (None, None) => None,
    };

    Ok(())
}

/// Вывести конфигурацию как JSON, скрывая пароли без `reveal`
pub fn print_config(config: &RawConfig, reveal: bool) -> Result<()> {
    let shown = if reveal {
        config.clone()
    } else {
        redacted(config)
    };

    println!("{}", serde_json::to_string_pretty(&Value::Object(shown))?);
    Ok(())
}
