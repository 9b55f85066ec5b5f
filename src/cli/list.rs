//! Список настроенных серверов

use std::path::Path;

use colored::Colorize;

use crate::error::Result;
use crate::store::Stores;

use super::open_registry;

/// Показать список всех настроенных серверов
pub fn run(path: &Path) -> Result<()> {
    let mut stores = Stores::new();
    let registry = open_registry(&mut stores, path)?;

    println!("{}", "=== Настроенные серверы ===".cyan().bold());
    println!();

    if registry.is_empty() {
        println!("Серверы не настроены.");
        println!();
        println!(
            "Выполните {} для добавления сервера.",
            "server-registry server add".cyan()
        );
        return Ok(());
    }

    println!(
        "{:<3} {:<6} {:<30} {:<20}",
        "",
        "#".bold(),
        "ПОДКЛЮЧЕНИЕ".bold(),
        "CONTROL".bold()
    );
    println!("{}", "─".repeat(60).dimmed());

    let current = registry.current_server_index();
    for (index, server) in registry.servers().iter().enumerate() {
        let index = index + 1;
        let marker = if current == Some(index) { "*" } else { "" };
        let control = server.settings().controlhost.as_str();

        println!(
            "{:<3} {:<6} {:<30} {:<20}",
            marker.green().bold(),
            index,
            server.connection_string(),
            if control.is_empty() { "-" } else { control }
        );
    }

    println!();
    Ok(())
}
