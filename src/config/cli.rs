//! Command-line options.
//!
//! # Examples
//!
//! ```bash
//! # Import a dump into the default database
//! dump_import import legacy.sql
//!
//! # Import into a specific database with JSON logs
//! dump_import import legacy.sql --db-path ./logistics.db --log-format json
//!
//! # Serve the upload endpoint
//! dump_import serve --port 9000
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::constants::{
    DB_PATH, DB_PATH_ENV, DEFAULT_BIND_ADDRESS, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_SERVER_PORT,
};
use crate::config::types::{Config, LogFormat, LogLevel};

#[derive(Debug, Parser)]
#[command(
    name = "dump_import",
    about = "Imports legacy SQL dumps into the logistics key-value store."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import a dump file and print the per-entity report
    Import(ImportCommand),
    /// Serve the dump upload endpoint
    Serve(ServeCommand),
}

/// Options shared by every subcommand.
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    #[arg(long, env = DB_PATH_ENV, default_value = DB_PATH)]
    pub db_path: PathBuf,
}

#[derive(Debug, Args)]
pub struct ImportCommand {
    /// SQL dump to import
    #[arg(value_parser)]
    pub file: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to bind
    #[arg(long, default_value = DEFAULT_BIND_ADDRESS)]
    pub bind: String,

    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_SERVER_PORT)]
    pub port: u16,

    /// Maximum upload size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl From<CommonArgs> for Config {
    fn from(args: CommonArgs) -> Self {
        Config {
            log_level: args.log_level,
            log_format: args.log_format,
            db_path: args.db_path,
            ..Default::default()
        }
    }
}

impl From<ServeCommand> for Config {
    fn from(cmd: ServeCommand) -> Self {
        Config {
            bind: cmd.bind,
            port: cmd.port,
            max_upload_bytes: cmd.max_upload_bytes,
            ..Config::from(cmd.common)
        }
    }
}
