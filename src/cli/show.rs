//! Эффективная конфигурация сервера

use std::path::Path;

use crate::error::Result;
use crate::store::Stores;

use super::{open_registry, print_config, select_target, ServerTarget};

pub fn run(path: &Path, target: &ServerTarget, simple: bool, reveal: bool) -> Result<()> {
    let mut stores = Stores::new();
    let registry = open_registry(&mut stores, path)?;

    select_target(registry, target)?;

    print_config(&registry.current_server_config(simple), reveal)
}
