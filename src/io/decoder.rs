//! Streaming byte to codepoint decoder
//!
//! Accepts byte chunks split at arbitrary boundaries, including in the middle
//! of a multi-byte sequence or a surrogate pair, and forwards complete
//! codepoints to a [`CodepointSink`].
//!
//! Each `write` runs decode passes into a fixed-size unit buffer. A pass ends
//! when the unit buffer is full (overflow, another pass follows) or when the
//! input is exhausted (underflow, the call returns). Bytes of an incomplete
//! trailing sequence stay buffered for the next `write`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::buffer::ByteBuffer;
use super::charset::{Charset, CoderResult};
use crate::error::{DecodeError, Error, Result};

/// Default size of the intermediate unit buffer
pub const DEFAULT_UNIT_BUFFER_SIZE: usize = 512;

/// Smallest unit buffer that can hold a surrogate pair
pub const MIN_UNIT_BUFFER_SIZE: usize = 2;

const REPLACEMENT: char = '\u{FFFD}';

/// Receiver of decoded codepoints
///
/// A single write may invoke the sink any number of times. It is never
/// invoked with an empty slice.
pub trait CodepointSink {
    fn accept(&mut self, codepoints: &[char]);
}

impl<F> CodepointSink for F
where
    F: FnMut(&[char]),
{
    fn accept(&mut self, codepoints: &[char]) {
        self(codepoints)
    }
}

impl CodepointSink for Vec<char> {
    fn accept(&mut self, codepoints: &[char]) {
        self.extend_from_slice(codepoints);
    }
}

/// What to do with input that cannot be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorMode {
    /// Substitute U+FFFD for the offending unit
    #[default]
    Replace,
    /// Drop the offending unit
    Skip,
    /// Deliver what decoded cleanly, reset, and return the error
    Strict,
}

impl FromStr for ErrorMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "replace" => Ok(ErrorMode::Replace),
            "skip" => Ok(ErrorMode::Skip),
            "strict" => Ok(ErrorMode::Strict),
            _ => Err(format!("unknown decode error mode: {}", s)),
        }
    }
}

impl fmt::Display for ErrorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorMode::Replace => "replace",
            ErrorMode::Skip => "skip",
            ErrorMode::Strict => "strict",
        })
    }
}

/// Incremental decoder delivering codepoints to a sink
#[derive(Debug)]
pub struct Decoder<S> {
    charset: Charset,
    mode: ErrorMode,
    /// Undecoded input
    bytes: ByteBuffer,
    /// Intermediate UTF-16 units for one pass
    units: Vec<u16>,
    /// High surrogate waiting for its low half
    high_surrogate: Option<u16>,
    sink: S,
}

impl<S: CodepointSink> Decoder<S> {
    /// Create a decoder with the default unit buffer size
    pub fn new(charset: Charset, sink: S) -> Self {
        Self::build(DEFAULT_UNIT_BUFFER_SIZE, charset, sink)
    }

    /// Create a decoder with a unit buffer of `size` units
    ///
    /// `size` must be at least 2 so that a surrogate pair fits in one pass.
    pub fn with_capacity(size: usize, charset: Charset, sink: S) -> Result<Self> {
        if size < MIN_UNIT_BUFFER_SIZE {
            return Err(Error::InvalidBufferSize(size));
        }
        Ok(Self::build(size, charset, sink))
    }

    fn build(size: usize, charset: Charset, sink: S) -> Self {
        Self {
            charset,
            mode: ErrorMode::default(),
            bytes: ByteBuffer::with_capacity(size),
            units: vec![0; size],
            high_surrogate: None,
            sink,
        }
    }

    /// Set the policy for undecodable input
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.mode = mode;
        self
    }

    /// Current charset
    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Current error policy
    pub fn error_mode(&self) -> ErrorMode {
        self.mode
    }

    /// Switch charsets for subsequently decoded bytes
    ///
    /// Callers must only switch at a unit boundary. Bytes still buffered from
    /// an incomplete sequence are decoded under the new charset.
    pub fn set_charset(&mut self, charset: Charset) {
        if !self.bytes.is_empty() {
            tracing::warn!(
                "Switching charset {} -> {} with {} undecoded bytes buffered",
                self.charset,
                charset,
                self.bytes.len()
            );
        }
        tracing::debug!("Decoder charset set to {}", charset);
        self.charset = charset;
    }

    /// Number of bytes held from an incomplete sequence
    pub fn buffered(&self) -> usize {
        self.bytes.len()
    }

    /// Drop buffered bytes and any pending high surrogate
    pub fn reset(&mut self) {
        self.bytes.clear();
        self.high_surrogate = None;
    }

    /// Sink receiving decoded codepoints
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the sink
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the decoder, returning its sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Decode a chunk of bytes
    ///
    /// In [`ErrorMode::Strict`] the first fault resets the decoder and is
    /// returned; codepoints decoded before it have already been delivered.
    pub fn write(&mut self, data: &[u8]) -> std::result::Result<(), DecodeError> {
        self.bytes.extend(data);

        let mut codepoints = Vec::with_capacity(self.units.len());
        loop {
            let step = self.charset.decode(self.bytes.readable(), &mut self.units);
            let malformed = match step.result {
                CoderResult::Malformed(len) => {
                    let start = step.read;
                    Some(self.bytes.readable()[start..start + len].to_vec())
                }
                _ => None,
            };
            self.bytes.consume(step.read);

            codepoints.clear();
            let mut fault = self.combine(step.written, &mut codepoints);

            if let Some(bytes) = malformed {
                self.bytes.consume(bytes.len());
                let err = DecodeError::Malformed {
                    charset: self.charset,
                    bytes,
                };
                if fault.is_none() {
                    fault = self.recover(err, &mut codepoints);
                }
            }

            if !codepoints.is_empty() {
                self.sink.accept(&codepoints);
            }

            if let Some(err) = fault {
                self.reset();
                return Err(err);
            }

            match step.result {
                CoderResult::Overflow | CoderResult::Malformed(_) => continue,
                CoderResult::Underflow => break,
            }
        }

        self.bytes.compact();
        Ok(())
    }

    /// Pair surrogates in the first `len` units of this pass
    ///
    /// Returns the fault that stopped the pass in strict mode.
    fn combine(&mut self, len: usize, out: &mut Vec<char>) -> Option<DecodeError> {
        for i in 0..len {
            let unit = self.units[i];

            if let Some(high) = self.high_surrogate.take() {
                if is_low_surrogate(unit) {
                    let cp = 0x10000 + (((high as u32) - 0xD800) << 10) + ((unit as u32) - 0xDC00);
                    // A high/low pair always lands in 0x10000..=0x10FFFF
                    out.extend(char::from_u32(cp));
                    continue;
                }
                if let Some(err) = self.recover(DecodeError::UnpairedSurrogate(high), out) {
                    return Some(err);
                }
            }

            if is_high_surrogate(unit) {
                self.high_surrogate = Some(unit);
            } else if is_low_surrogate(unit) {
                if let Some(err) = self.recover(DecodeError::UnpairedSurrogate(unit), out) {
                    return Some(err);
                }
            } else if let Some(c) = char::from_u32(unit as u32) {
                out.push(c);
            }
        }
        None
    }

    /// Apply the error policy, returning the error only in strict mode
    fn recover(&self, err: DecodeError, out: &mut Vec<char>) -> Option<DecodeError> {
        match self.mode {
            ErrorMode::Replace => {
                tracing::debug!("Replacing undecodable input: {}", err);
                out.push(REPLACEMENT);
                None
            }
            ErrorMode::Skip => {
                tracing::debug!("Skipping undecodable input: {}", err);
                None
            }
            ErrorMode::Strict => Some(err),
        }
    }
}

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}
