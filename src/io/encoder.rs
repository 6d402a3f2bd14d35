//! Codepoint to byte encoder for the output path

use super::charset::Charset;
use super::decoder::CodepointSink;

/// Encodes codepoint chunks and hands the bytes to a writer callback
pub struct Encoder<F> {
    charset: Charset,
    buf: Vec<u8>,
    write: F,
}

impl<F> Encoder<F>
where
    F: FnMut(&[u8]),
{
    /// Create an encoder passing encoded bytes to `write`
    pub fn new(charset: Charset, write: F) -> Self {
        Self {
            charset,
            buf: Vec::with_capacity(64),
            write,
        }
    }

    /// Current charset
    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Switch charsets for subsequent output
    pub fn set_charset(&mut self, charset: Charset) {
        self.charset = charset;
    }
}

impl<F> CodepointSink for Encoder<F>
where
    F: FnMut(&[u8]),
{
    fn accept(&mut self, codepoints: &[char]) {
        self.buf.clear();
        self.charset.encode(codepoints, &mut self.buf);
        if !self.buf.is_empty() {
            (self.write)(&self.buf);
        }
    }
}
