//! Application glue module
//!
//! Configuration and command-line arguments.

mod config;

pub use config::{CliArgs, Config, ConfigError};
