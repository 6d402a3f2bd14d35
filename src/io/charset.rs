//! Text encodings supported on the wire
//!
//! Decoding is split in two stages, mirroring how 16-bit text APIs work:
//! bytes are first decoded into UTF-16 code units by [`Charset::decode`],
//! then the [`Decoder`](super::Decoder) pairs surrogates into scalar values.
//! Natively 16-bit encodings pass their units through untouched, so unpaired
//! surrogates on the wire surface in the second stage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Replacement written for characters the target charset cannot represent
const ENCODE_REPLACEMENT: u8 = b'?';

/// Supported charsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Charset {
    #[default]
    Utf8,
    Utf16Be,
    Utf16Le,
    /// ISO-8859-1, every byte maps to U+0000..U+00FF
    Latin1,
    /// 7-bit US-ASCII, bytes >= 0x80 are malformed
    Ascii,
}

/// Unknown charset name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown charset: {0}")]
pub struct UnknownCharset(pub String);

/// Outcome of one decode step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CoderResult {
    /// All decodable input consumed; any remaining bytes are an incomplete unit
    Underflow,
    /// Output buffer full
    Overflow,
    /// Malformed sequence of the given length starts at `Step::read`
    Malformed(usize),
}

/// Progress of one decode step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Step {
    pub read: usize,
    pub written: usize,
    pub result: CoderResult,
}

impl Step {
    fn new(read: usize, written: usize, result: CoderResult) -> Self {
        Self {
            read,
            written,
            result,
        }
    }
}

impl Charset {
    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Utf16Be => "UTF-16BE",
            Charset::Utf16Le => "UTF-16LE",
            Charset::Latin1 => "ISO-8859-1",
            Charset::Ascii => "US-ASCII",
        }
    }

    /// Decode as many bytes of `input` as fit into `output` as UTF-16 units
    pub(crate) fn decode(self, input: &[u8], output: &mut [u16]) -> Step {
        match self {
            Charset::Utf8 => decode_utf8(input, output),
            Charset::Utf16Be => decode_utf16(input, output, u16::from_be_bytes),
            Charset::Utf16Le => decode_utf16(input, output, u16::from_le_bytes),
            Charset::Latin1 => decode_single_byte(input, output, 0xFF),
            Charset::Ascii => decode_single_byte(input, output, 0x7F),
        }
    }

    /// Encode `chars`, appending to `out`
    ///
    /// Characters outside ISO-8859-1 or US-ASCII are written as `?`.
    pub fn encode(self, chars: &[char], out: &mut Vec<u8>) {
        match self {
            Charset::Utf8 => {
                let mut buf = [0u8; 4];
                for &c in chars {
                    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
            }
            Charset::Utf16Be | Charset::Utf16Le => {
                let mut buf = [0u16; 2];
                for &c in chars {
                    for &unit in c.encode_utf16(&mut buf).iter() {
                        let bytes = if self == Charset::Utf16Be {
                            unit.to_be_bytes()
                        } else {
                            unit.to_le_bytes()
                        };
                        out.extend_from_slice(&bytes);
                    }
                }
            }
            Charset::Latin1 => out.extend(chars.iter().map(|&c| narrow(c, 0xFF))),
            Charset::Ascii => out.extend(chars.iter().map(|&c| narrow(c, 0x7F))),
        }
    }
}

fn narrow(c: char, max: u32) -> u8 {
    let cp = c as u32;
    if cp <= max {
        cp as u8
    } else {
        ENCODE_REPLACEMENT
    }
}

fn decode_utf8(input: &[u8], output: &mut [u16]) -> Step {
    let mut read = 0;
    let mut written = 0;

    while read < input.len() {
        let lead = input[read];

        // ASCII fast path
        if lead < 0x80 {
            if written == output.len() {
                return Step::new(read, written, CoderResult::Overflow);
            }
            output[written] = lead as u16;
            written += 1;
            read += 1;
            continue;
        }

        let (width, min) = match lead {
            0xC2..=0xDF => (2, 0x80),
            0xE0..=0xEF => (3, 0x800),
            0xF0..=0xF4 => (4, 0x10000),
            _ => return Step::new(read, written, CoderResult::Malformed(1)),
        };

        let available = input.len() - read;
        for i in 1..width.min(available) {
            if input[read + i] & 0b1100_0000 != 0b1000_0000 {
                return Step::new(read, written, CoderResult::Malformed(i));
            }
        }
        if available < width {
            // Incomplete sequence, wait for more input
            return Step::new(read, written, CoderResult::Underflow);
        }

        let mut cp = (lead as u32) & (0x7F >> width);
        for &byte in &input[read + 1..read + width] {
            cp = (cp << 6) | (byte & 0x3F) as u32;
        }
        // Overlong encodings, encoded surrogates and values past U+10FFFF
        let c = match char::from_u32(cp) {
            Some(c) if cp >= min => c,
            _ => return Step::new(read, written, CoderResult::Malformed(width)),
        };

        if output.len() - written < c.len_utf16() {
            return Step::new(read, written, CoderResult::Overflow);
        }
        written += c.encode_utf16(&mut output[written..]).len();
        read += width;
    }

    Step::new(read, written, CoderResult::Underflow)
}

fn decode_utf16(input: &[u8], output: &mut [u16], unit: fn([u8; 2]) -> u16) -> Step {
    let mut read = 0;
    let mut written = 0;

    while input.len() - read >= 2 {
        if written == output.len() {
            return Step::new(read, written, CoderResult::Overflow);
        }
        output[written] = unit([input[read], input[read + 1]]);
        written += 1;
        read += 2;
    }

    Step::new(read, written, CoderResult::Underflow)
}

fn decode_single_byte(input: &[u8], output: &mut [u16], max: u8) -> Step {
    let mut read = 0;
    let mut written = 0;

    while read < input.len() {
        let byte = input[read];
        if byte > max {
            return Step::new(read, written, CoderResult::Malformed(1));
        }
        if written == output.len() {
            return Step::new(read, written, CoderResult::Overflow);
        }
        output[written] = byte as u16;
        written += 1;
        read += 1;
    }

    Step::new(read, written, CoderResult::Underflow)
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = UnknownCharset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(Charset::Utf8),
            "utf-16be" | "utf16be" => Ok(Charset::Utf16Be),
            "utf-16le" | "utf16le" => Ok(Charset::Utf16Le),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Ok(Charset::Latin1),
            "us-ascii" | "ascii" => Ok(Charset::Ascii),
            _ => Err(UnknownCharset(s.to_string())),
        }
    }
}

impl TryFrom<String> for Charset {
    type Error = UnknownCharset;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Charset> for &'static str {
    fn from(charset: Charset) -> Self {
        charset.name()
    }
}
