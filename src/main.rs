use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use server_registry::cli::{self, ServerTarget};
use server_registry::config::{self, CONFIG_ENV};
use server_registry::ConnectionRole;

#[derive(Parser)]
#[command(name = "server-registry")]
#[command(author = "Oleg")]
#[command(version = "0.1.0")]
#[command(about = "Реестр серверов баз данных и параметров подключения", long_about = None)]
struct Cli {
    /// Путь к файлу конфигурации
    #[arg(long, global = true, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Показать список серверов
    List,

    /// Показать эффективную конфигурацию сервера
    Show {
        #[command(flatten)]
        target: ServerTarget,

        /// Без глобальных значений по умолчанию
        #[arg(long)]
        simple: bool,

        /// Показать пароли
        #[arg(long)]
        reveal: bool,
    },

    /// Показать параметры подключения для роли
    Params {
        /// Роль подключения: user, control или auxiliary
        #[arg(long, default_value = "user")]
        role: ConnectionRole,

        #[command(flatten)]
        target: ServerTarget,

        /// Показать пароли
        #[arg(long)]
        reveal: bool,
    },

    /// Подключиться к первому доступному серверу
    Connect {
        /// Таймаут подключения в секундах
        #[arg(long, default_value_t = 3)]
        timeout: u64,
    },

    /// Проверить файл конфигурации
    Check,

    /// Управление конфигурациями серверов
    Server {
        #[command(subcommand)]
        action: ServerCommands,
    },
}

#[derive(Subcommand)]
enum ServerCommands {
    /// Добавить новый сервер
    Add {
        #[arg(long)]
        host: String,
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        user: String,
        #[arg(long)]
        password: String,
    },
    /// Удалить сервер
    Remove {
        /// Индекс сервера для удаления
        index: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Ошибка:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let path = match cli.config {
        Some(path) => path,
        None => config::default_config_path().context("no --config given")?,
    };

    let result = match cli.command {
        Commands::List => cli::list::run(&path),
        Commands::Show {
            target,
            simple,
            reveal,
        } => cli::show::run(&path, &target, simple, reveal),
        Commands::Params {
            role,
            target,
            reveal,
        } => cli::params::run(&path, role, &target, reveal),
        Commands::Connect { timeout } => cli::connect::run(&path, Duration::from_secs(timeout)),
        Commands::Check => cli::check::run(&path),
        Commands::Server { action } => match action {
            ServerCommands::Add {
                host,
                port,
                user,
                password,
            } => cli::server::add(&path, &host, port, &user, &password),
            ServerCommands::Remove { index } => cli::server::remove(&path, index),
        },
    };

    result.with_context(|| format!("config file {}", path.display()))
}
