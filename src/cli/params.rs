//! Параметры подключения для роли

use std::path::Path;

use colored::Colorize;

use crate::error::Result;
use crate::store::{ConnectionRole, Stores};

use super::{open_registry, print_config, select_target, ServerTarget};

pub fn run(path: &Path, role: ConnectionRole, target: &ServerTarget, reveal: bool) -> Result<()> {
    let mut stores = Stores::new();
    let registry = open_registry(&mut stores, path)?;

    select_target(registry, target)?;

    let params = registry.get_current_server_connection_params(role, None);

    println!("{} {}", "Роль:".cyan(), role.to_string().bold());
    println!(
        "{} {}",
        "Пользователь:".cyan(),
        params.user.as_deref().unwrap_or("-")
    );
    println!(
        "{} {}",
        "Пароль:".cyan(),
        match params.password() {
            None => "-",
            Some(password) if reveal => password,
            Some(_) => "********",
        }
    );

    match params.server.as_ref() {
        Some(server) => print_config(server, reveal)?,
        None => println!("{} -", "Сервер:".cyan()),
    }

    Ok(())
}
