//! Подключение к первому доступному серверу

use std::path::Path;
use std::time::Duration;

use colored::Colorize;

use crate::connect::TcpProbe;
use crate::error::{RegistryError, Result};
use crate::store::Stores;

use super::open_registry;

pub fn run(path: &Path, timeout: Duration) -> Result<()> {
    let mut stores = Stores::new();
    let registry = open_registry(&mut stores, path)?;

    if registry.is_empty() {
        return Err(RegistryError::NoServersConfigured);
    }

    registry.attach_connector(TcpProbe::new(timeout));

    println!("{}", "Поиск доступного сервера...".cyan());

    let index = registry
        .set_current_server_by_default()
        .ok_or(RegistryError::NoServerReachable)?;

    let server = registry
        .current_server()
        .ok_or(RegistryError::MissingServerIndex(index))?;

    println!(
        "{} [{}] {}",
        "Подключено:".green().bold(),
        index,
        server.connection_string().bold()
    );

    Ok(())
}
