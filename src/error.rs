//! Error types for the TTY pipeline

use std::io;
use thiserror::Error;

use crate::app::ConfigError;
use crate::io::Charset;

/// Decoding failure raised by [`Decoder`](crate::io::Decoder) in strict mode
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Byte sequence not valid in the configured charset
    #[error("malformed {charset} input: {bytes:02x?}")]
    Malformed { charset: Charset, bytes: Vec<u8> },

    /// High surrogate without a following low surrogate, or a lone low surrogate
    #[error("unpaired surrogate unit {0:#06x}")]
    UnpairedSurrogate(u16),
}

/// Error type for the TTY pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Input could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Intermediate unit buffer too small to hold a surrogate pair
    #[error("unit buffer size must be at least 2, got {0}")]
    InvalidBufferSize(usize),

    /// `try_next` called with nothing resolvable
    #[error("event queue exhausted")]
    Exhausted,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for TTY pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
