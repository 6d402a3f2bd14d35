//! Per-connection TTY session
//!
//! Wires the input path (bytes → [`Decoder`] → [`EventQueue`]) and the output
//! path (codepoints → onlcr → [`Encoder`] → bytes). The transport owns the
//! connection and calls [`TtySession::feed`] with whatever bytes arrive.

use std::sync::Arc;

use super::output::OutputMode;
use crate::app::Config;
use crate::error::{DecodeError, Result};
use crate::io::{Charset, Decoder, Encoder};
use crate::readline::{EventQueue, KeyEvent, Keymap};

/// Input and output state for one connection
#[derive(Debug)]
pub struct TtySession {
    decoder: Decoder<EventQueue>,
}

impl TtySession {
    /// Create a session sharing `keymap`
    pub fn new(keymap: Arc<Keymap>, config: &Config) -> Result<Self> {
        let decoder =
            Decoder::with_capacity(config.unit_buffer_size, config.charset, EventQueue::new(keymap))?
                .with_error_mode(config.decode_errors);
        tracing::debug!(
            "New TTY session: charset={}, decode_errors={}",
            config.charset,
            config.decode_errors
        );
        Ok(Self { decoder })
    }

    /// Create a session with the default configuration
    pub fn with_keymap(keymap: Arc<Keymap>) -> Self {
        Self {
            decoder: Decoder::new(Charset::default(), EventQueue::new(keymap)),
        }
    }

    /// Feed raw bytes from the transport
    pub fn feed(&mut self, bytes: &[u8]) -> std::result::Result<(), DecodeError> {
        self.decoder.write(bytes)
    }

    /// Key event queue fed by this session
    pub fn events(&mut self) -> &mut EventQueue {
        self.decoder.sink_mut()
    }

    /// Next resolvable key event, if any
    pub fn next_event(&mut self) -> Option<KeyEvent> {
        self.events().next()
    }

    pub fn charset(&self) -> Charset {
        self.decoder.charset()
    }

    /// Change the charset for both directions
    pub fn set_charset(&mut self, charset: Charset) {
        self.decoder.set_charset(charset);
    }

    /// Normalize and encode output, passing each encoded chunk to `write`
    pub fn write_output<F>(&self, text: &[char], write: F)
    where
        F: FnMut(&[u8]),
    {
        let mut output = OutputMode::new(Encoder::new(self.charset(), write));
        output.accept(text);
    }

    pub fn write_str<F>(&self, text: &str, write: F)
    where
        F: FnMut(&[u8]),
    {
        let chars: Vec<char> = text.chars().collect();
        self.write_output(&chars, write);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ErrorMode;

    fn session() -> TtySession {
        let keymap = Keymap::builder()
            .bind_function(&['\x1b', '[', 'A'], "previous-history")
            .build();
        TtySession::with_keymap(Arc::new(keymap))
    }

    #[test]
    fn test_feed_resolves_events() {
        let mut session = session();
        session.feed(b"\x1b[").unwrap();
        assert!(session.next_event().is_none());

        session.feed(b"Ax").unwrap();
        assert_eq!(
            session.next_event().and_then(|e| e.function().map(str::to_string)),
            Some("previous-history".to_string())
        );
        assert_eq!(session.next_event(), Some(KeyEvent::Literal('x')));
        assert_eq!(session.next_event(), None);
    }

    #[test]
    fn test_write_output_applies_onlcr() {
        let session = session();
        let mut out = Vec::new();
        session.write_str("a\nb", |bytes| out.extend_from_slice(bytes));
        assert_eq!(out, b"a\r\nb");
    }

    #[test]
    fn test_charset_applies_both_ways() {
        let mut session = session();
        session.set_charset(Charset::Latin1);
        session.feed(&[0xE9]).unwrap();
        assert_eq!(session.next_event(), Some(KeyEvent::Literal('é')));

        let mut out = Vec::new();
        session.write_str("é\n", |bytes| out.extend_from_slice(bytes));
        assert_eq!(out, vec![0xE9, b'\r', b'\n']);
    }

    #[test]
    fn test_new_from_config() {
        let config = Config {
            decode_errors: ErrorMode::Strict,
            ..Config::default()
        };
        let mut session = TtySession::new(Arc::new(Keymap::bundled()), &config).unwrap();
        assert!(session.feed(&[0xFF]).is_err());
    }

    #[test]
    fn test_new_rejects_tiny_buffer() {
        let config = Config {
            unit_buffer_size: 1,
            ..Config::default()
        };
        assert!(TtySession::new(Arc::new(Keymap::default()), &config).is_err());
    }
}
