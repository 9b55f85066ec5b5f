//! Проверка файла конфигурации

use std::path::Path;

use colored::Colorize;

use crate::error::Result;
use crate::store::Stores;

use super::open_registry;

pub fn run(path: &Path) -> Result<()> {
    let mut stores = Stores::new();
    let registry = open_registry(&mut stores, path)?;

    println!(
        "{} {} ({} серверов)",
        "Конфигурация корректна:".green().bold(),
        path.display(),
        registry.len()
    );

    Ok(())
}
