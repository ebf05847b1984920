//! Configuration types.
//!
//! This module defines the enums and structs shared by the library and the
//! command-line front end.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    BATCH_WRITE_LIMIT, DB_PATH, DEFAULT_BIND_ADDRESS, DEFAULT_MAX_UPLOAD_BYTES,
    DEFAULT_SERVER_PORT, RETRY_MAX_ATTEMPTS, RETRY_MAX_DELAY_SECS, UNPROCESSED_RETRY_DELAY_MS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Resubmission policy for unprocessed batch items.
///
/// Delays grow exponentially from `initial_delay`, are capped at `max_delay`,
/// and at most `max_attempts` resubmissions follow the initial call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(UNPROCESSED_RETRY_DELAY_MS),
            max_delay: Duration::from_secs(RETRY_MAX_DELAY_SECS),
            max_attempts: RETRY_MAX_ATTEMPTS,
        }
    }
}

/// Tuning knobs for the storage layer.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Requests a single batch call processes before reporting the rest unprocessed
    pub max_batch_items: usize,
    /// Resubmission policy for unprocessed items
    pub retry: RetryPolicy,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_batch_items: BATCH_WRITE_LIMIT,
            retry: RetryPolicy::default(),
        }
    }
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use dump_import::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("./logistics.db"),
///     port: 9000,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Upload server bind address
    pub bind: String,

    /// Upload server port
    pub port: u16,

    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,

    /// Storage layer options
    pub store: StoreOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            db_path: PathBuf::from(DB_PATH),
            bind: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_SERVER_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            store: StoreOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.db_path, PathBuf::from("./dump_import.db"));
        assert_eq!(config.port, 8087);
        assert_eq!(config.store.max_batch_items, 25);
        assert_eq!(config.store.retry.initial_delay, Duration::from_millis(200));
    }

    #[test]
    fn test_retry_policy_is_bounded() {
        let policy = RetryPolicy::default();
        assert!(policy.max_attempts > 0);
        assert!(policy.max_delay >= policy.initial_delay);
    }
}
