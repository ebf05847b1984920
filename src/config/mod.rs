//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (batch limits, retry policy, defaults)
//! - Library configuration types
//! - CLI option types and parsing

mod cli;
mod constants;
mod types;

// Re-export all constants
pub use cli::{Cli, Command, CommonArgs, ImportCommand, ServeCommand};
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel, RetryPolicy, StoreOptions};
