//! Key event queue
//!
//! Holds codepoints not yet resolved into events and events resolved but not
//! yet delivered. Resolution is greedy: as soon as the pending input starts
//! with a complete binding, the longest such binding fires, even if a longer
//! binding could still be completed by more input. When nothing matches and
//! no binding can be continued, the first codepoint is delivered as a
//! [`KeyEvent::Literal`].

use std::collections::VecDeque;
use std::sync::Arc;

use super::event::KeyEvent;
use super::keymap::{KeyBinding, Keymap};
use crate::error::{Error, Result};
use crate::io::CodepointSink;

/// Stateful matcher from codepoints to key events
#[derive(Debug, Clone)]
pub struct EventQueue {
    keymap: Arc<Keymap>,
    /// Resolved, undelivered events
    events: VecDeque<KeyEvent>,
    /// Unresolved input
    pending: Vec<char>,
}

impl EventQueue {
    pub fn new(keymap: Arc<Keymap>) -> Self {
        Self {
            keymap,
            events: VecDeque::new(),
            pending: Vec::new(),
        }
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// Append input codepoints; matching happens on `peek`/`next`
    pub fn append(&mut self, codepoints: &[char]) -> &mut Self {
        self.pending.extend_from_slice(codepoints);
        self
    }

    /// Enqueue an event ahead of any matching
    pub fn append_event(&mut self, event: KeyEvent) -> &mut Self {
        self.events.push_back(event);
        self
    }

    /// Next event without consuming it
    pub fn peek(&self) -> Option<KeyEvent> {
        match self.events.front() {
            Some(event) => Some(event.clone()),
            None => self.resolve(),
        }
    }

    pub fn has_next(&self) -> bool {
        !self.events.is_empty() || self.resolve().is_some()
    }

    /// Remove and return the next event
    ///
    /// Returns [`Error::Exhausted`] when nothing is resolvable; use
    /// [`has_next`](Self::has_next) to check first.
    pub fn try_next(&mut self) -> Result<KeyEvent> {
        if self.events.is_empty() {
            if let Some(event) = self.resolve() {
                self.pending.drain(..event.len());
                self.events.push_back(event);
            }
        }
        self.events.pop_front().ok_or(Error::Exhausted)
    }

    /// Drop queued events and take the unresolved input
    pub fn clear(&mut self) -> Vec<char> {
        self.events.clear();
        std::mem::take(&mut self.pending)
    }

    /// Unresolved input
    pub fn buffer(&self) -> &[char] {
        &self.pending
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Match the pending input against the keymap
    fn resolve(&self) -> Option<KeyEvent> {
        let buffer = self.pending.as_slice();
        let first = *buffer.first()?;

        let mut candidate: Option<&KeyBinding> = None;
        let mut continuations = 0usize;

        for binding in self.keymap.bindings() {
            let sequence = binding.sequence();
            if sequence.is_empty() {
                continue;
            }
            if sequence.len() <= buffer.len() {
                if buffer.starts_with(sequence)
                    && candidate.map_or(true, |c| c.len() <= sequence.len())
                {
                    candidate = Some(binding);
                }
            } else if sequence.starts_with(buffer) {
                continuations += 1;
            }
        }

        match candidate {
            Some(binding) => Some(KeyEvent::from_binding(binding)),
            None if continuations == 0 => Some(KeyEvent::Literal(first)),
            None => {
                tracing::trace!(
                    "{} pending codepoints await more input ({} continuations)",
                    buffer.len(),
                    continuations
                );
                None
            }
        }
    }
}

impl Iterator for EventQueue {
    type Item = KeyEvent;

    fn next(&mut self) -> Option<KeyEvent> {
        self.try_next().ok()
    }
}

impl CodepointSink for EventQueue {
    fn accept(&mut self, codepoints: &[char]) {
        self.append(codepoints);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn function(name: &str, sequence: &str) -> KeyEvent {
        KeyEvent::Function {
            name: name.to_string(),
            sequence: chars(sequence),
        }
    }

    fn queue(bindings: &[(&str, &str)]) -> EventQueue {
        let keymap = bindings
            .iter()
            .fold(Keymap::builder(), |b, (seq, name)| {
                b.bind_function(&chars(seq), name)
            })
            .build();
        EventQueue::new(Arc::new(keymap))
    }

    #[test]
    fn test_exact_match() {
        let mut queue = queue(&[("\x1b[A", "up")]);
        queue.append(&chars("\x1b[A"));

        assert!(queue.has_next());
        assert_eq!(queue.try_next().unwrap(), function("up", "\x1b[A"));
        assert!(!queue.has_next());
        assert!(queue.buffer().is_empty());
    }

    #[test]
    fn test_partial_sequence_waits() {
        let mut queue = queue(&[("\x1b[A", "up")]);
        queue.append(&chars("\x1b["));
        assert!(!queue.has_next());
        assert_eq!(queue.peek(), None);

        queue.append(&['A']);
        assert_eq!(queue.peek(), Some(function("up", "\x1b[A")));
        assert_eq!(queue.next(), Some(function("up", "\x1b[A")));
    }

    #[test]
    fn test_greedy_preemption() {
        let mut queue = queue(&[("ab", "A"), ("abc", "B")]);
        queue.append(&chars("ab"));
        assert_eq!(queue.try_next().unwrap(), function("A", "ab"));
    }

    #[test]
    fn test_longest_complete_match_wins() {
        let mut queue = queue(&[("ab", "A"), ("abc", "B")]);
        queue.append(&chars("abcd"));
        assert_eq!(queue.try_next().unwrap(), function("B", "abc"));
        assert_eq!(queue.try_next().unwrap(), KeyEvent::Literal('d'));
    }

    #[test]
    fn test_unmatched_fallback() {
        let mut queue = queue(&[("\x1b[A", "up")]);
        queue.append(&chars("hi!"));
        let events: Vec<KeyEvent> = queue.by_ref().collect();
        assert_eq!(
            events,
            vec![
                KeyEvent::Literal('h'),
                KeyEvent::Literal('i'),
                KeyEvent::Literal('!')
            ]
        );
    }

    #[test]
    fn test_broken_sequence_falls_back_one_codepoint() {
        let mut queue = queue(&[("\x1b[A", "up")]);
        queue.append(&chars("\x1b[x"));
        assert_eq!(queue.next(), Some(KeyEvent::Literal('\x1b')));
        assert_eq!(queue.next(), Some(KeyEvent::Literal('[')));
        assert_eq!(queue.next(), Some(KeyEvent::Literal('x')));
        assert_eq!(queue.next(), None);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut queue = queue(&[]);
        queue.append(&['a']);
        assert_eq!(queue.peek(), Some(KeyEvent::Literal('a')));
        assert_eq!(queue.peek(), Some(KeyEvent::Literal('a')));
        assert_eq!(queue.buffer(), &['a']);
    }

    #[test]
    fn test_exhausted() {
        let mut queue = queue(&[]);
        assert!(matches!(queue.try_next(), Err(Error::Exhausted)));
        assert_eq!(queue.next(), None);
    }

    #[test]
    fn test_injected_event_comes_first() {
        let mut queue = queue(&[]);
        queue.append(&['x']);
        queue.append_event(function("redraw", ""));

        assert_eq!(queue.try_next().unwrap(), function("redraw", ""));
        assert_eq!(queue.try_next().unwrap(), KeyEvent::Literal('x'));
    }

    #[test]
    fn test_clear_returns_pending() {
        let mut queue = queue(&[("\x1b[A", "up")]);
        queue.append(&chars("\x1b["));
        queue.append_event(KeyEvent::Literal('z'));

        assert_eq!(queue.clear(), chars("\x1b["));
        assert!(!queue.has_next());
        assert_eq!(queue.pending_len(), 0);
    }

    #[test]
    fn test_macro_event() {
        let keymap = Keymap::builder().bind_macro(&['\x07'], "hello").build();
        let mut queue = EventQueue::new(Arc::new(keymap));
        queue.append(&['\x07']);
        assert_eq!(
            queue.try_next().unwrap(),
            KeyEvent::Macro {
                text: "hello".to_string(),
                sequence: vec!['\x07']
            }
        );
    }

    #[test]
    fn test_sink_appends() {
        let mut queue = queue(&[]);
        queue.accept(&['q']);
        assert_eq!(queue.buffer(), &['q']);
    }
}
