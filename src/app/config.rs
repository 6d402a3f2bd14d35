//! Configuration for the TTY pipeline
//!
//! Precedence: CLI > env > file > defaults. The config file lives at
//! `<config dir>/mochi/tty.toml`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::io::{Charset, ErrorMode, DEFAULT_UNIT_BUFFER_SIZE, MIN_UNIT_BUFFER_SIZE};

/// Upper bound for the intermediate unit buffer
const MAX_UNIT_BUFFER_SIZE: usize = 1 << 20;

/// CLI arguments for the `mochi-keys` runner
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "mochi-keys")]
#[command(version)]
#[command(about = "Decode terminal input into key events", long_about = None)]
pub struct CliArgs {
    /// Input file (stdin if not given)
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Path to custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Input charset (UTF-8, UTF-16BE, UTF-16LE, ISO-8859-1, US-ASCII)
    #[arg(long, value_name = "CHARSET")]
    pub charset: Option<Charset>,

    /// inputrc file with key bindings
    #[arg(short, long, value_name = "FILE")]
    pub inputrc: Option<PathBuf>,

    /// Undecodable input handling (replace, skip, strict)
    #[arg(long, value_name = "MODE")]
    pub decode_errors: Option<ErrorMode>,

    /// Feed input in chunks of this many bytes
    #[arg(long, value_name = "BYTES", default_value_t = 4096)]
    pub chunk_size: usize,

    /// Print events as JSON lines
    #[arg(short, long)]
    pub json: bool,
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Charset of the incoming byte stream and outgoing text
    pub charset: Charset,
    /// Policy for undecodable input
    pub decode_errors: ErrorMode,
    /// Units decoded per pass before the sink is invoked
    pub unit_buffer_size: usize,
    /// inputrc to build the keymap from; bundled bindings if unset
    pub inputrc: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            charset: Charset::Utf8,
            decode_errors: ErrorMode::Replace,
            unit_buffer_size: DEFAULT_UNIT_BUFFER_SIZE,
            inputrc: None,
        }
    }
}

impl Config {
    /// Load configuration applying file, env and CLI layers
    pub fn load_with_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        let config_path = args.config.clone().or_else(Self::default_config_path);
        if let Some(path) = &config_path {
            if path.exists() {
                match Self::load_from_file(path) {
                    Ok(file_config) => config = file_config,
                    Err(e) if args.config.is_some() => return Err(e),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            } else if args.config.is_some() {
                return Err(ConfigError::NotFound(path.clone()));
            }
        }

        config.apply_env_vars();
        config.apply_cli_args(args);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mochi").join("tty.toml"))
    }

    fn apply_env_vars(&mut self) {
        if let Ok(val) = env::var("MOCHI_TTY_CHARSET") {
            match val.parse() {
                Ok(charset) => self.charset = charset,
                Err(e) => tracing::warn!("Ignoring MOCHI_TTY_CHARSET: {}", e),
            }
        }
        if let Ok(val) = env::var("MOCHI_TTY_DECODE_ERRORS") {
            match val.parse() {
                Ok(mode) => self.decode_errors = mode,
                Err(e) => tracing::warn!("Ignoring MOCHI_TTY_DECODE_ERRORS: {}", e),
            }
        }
        if let Ok(val) = env::var("MOCHI_TTY_INPUTRC") {
            self.inputrc = Some(PathBuf::from(val));
        }
    }

    fn apply_cli_args(&mut self, args: &CliArgs) {
        if let Some(charset) = args.charset {
            self.charset = charset;
        }
        if let Some(mode) = args.decode_errors {
            self.decode_errors = mode;
        }
        if let Some(inputrc) = &args.inputrc {
            self.inputrc = Some(inputrc.clone());
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unit_buffer_size < MIN_UNIT_BUFFER_SIZE {
            return Err(ConfigError::Invalid {
                field: "unit_buffer_size",
                message: format!("must be at least {}", MIN_UNIT_BUFFER_SIZE),
            });
        }
        if self.unit_buffer_size > MAX_UNIT_BUFFER_SIZE {
            return Err(ConfigError::Invalid {
                field: "unit_buffer_size",
                message: format!("must be at most {}", MAX_UNIT_BUFFER_SIZE),
            });
        }
        Ok(())
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}
