//! Catalog CLI - sign in and manage the product catalog from a terminal

mod commands;
mod config;
mod logging;
mod navigator;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use tracing::{Level, debug, error};

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Client for the product catalog API")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Configuration file (defaults to <data dir>/catalog.toml when present)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Data directory holding the stored session and logs
    #[arg(short = 'd', long, global = true, env = "CATALOG_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Base URL of the catalog API
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // An unreadable config file is reported by the command that loads it
    let data_dir = config::resolve_data_dir(cli.config.as_deref(), cli.data_dir.as_deref())
        .unwrap_or_else(|_| {
            cli.data_dir
                .clone()
                .unwrap_or_else(catalog_core::config::default_data_dir)
        });
    logging::init_logging(cli.log_level.into(), &data_dir, cli.no_file_log)?;

    debug!("Starting catalog CLI");

    let options = commands::GlobalOptions {
        config: cli.config,
        data_dir: cli.data_dir,
        api_base_url: cli.api_base_url,
        json: cli.json,
    };

    if let Err(e) = cli.command.execute(options).await {
        error!("Command failed: {e:#}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
