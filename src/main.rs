//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `dump_import` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use dump_import::config::{Cli, Command};
use dump_import::initialization::{init_logger_with, init_store};
use dump_import::server::{start_server, AppState};
use dump_import::{import_file, Catalog, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // Try loading from current directory first, then from the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Import(cmd) => {
            let file = cmd.file.clone();
            let config = Config::from(cmd.common);
            init_logger_with(config.log_level.clone().into(), config.log_format.clone())
                .context("Failed to initialize logger")?;

            let store = init_store(&config)
                .await
                .context("Failed to initialize store")?;

            match import_file(&store, &file, &Catalog::default()).await {
                Ok(report) => {
                    let json = serde_json::to_string_pretty(&report)
                        .context("Failed to serialize import report")?;
                    println!("{json}");
                    Ok(())
                }
                Err(e) => {
                    eprintln!("dump_import error: {:#}", e);
                    process::exit(1);
                }
            }
        }
        Command::Serve(cmd) => {
            let config = Config::from(cmd);
            init_logger_with(config.log_level.clone().into(), config.log_format.clone())
                .context("Failed to initialize logger")?;

            let store = init_store(&config)
                .await
                .context("Failed to initialize store")?;
            let state = AppState::new(store, Catalog::default());

            start_server(&config.bind, config.port, config.max_upload_bytes, state).await
        }
    }
}
