//! Byte-level I/O
//!
//! Charset handling for the transport boundary: a streaming decoder from wire
//! bytes to codepoints and an encoder for the output direction.

mod buffer;
mod charset;
mod decoder;
mod encoder;

pub use buffer::ByteBuffer;
pub use charset::{Charset, UnknownCharset};
pub use decoder::{
    CodepointSink, Decoder, ErrorMode, DEFAULT_UNIT_BUFFER_SIZE, MIN_UNIT_BUFFER_SIZE,
};
pub use encoder::Encoder;
