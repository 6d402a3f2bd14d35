//! Key events produced by the event queue

use serde::Serialize;

use super::keymap::{Action, KeyBinding};

/// A resolved keystroke
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum KeyEvent {
    /// A bound function, interpreted by the line editor
    Function { name: String, sequence: Vec<char> },
    /// A bound macro, replayed by the line editor as if typed
    Macro { text: String, sequence: Vec<char> },
    /// A single codepoint matching no binding
    Literal(char),
}

impl KeyEvent {
    /// Event for a matched binding
    pub fn from_binding(binding: &KeyBinding) -> Self {
        let sequence = binding.sequence().to_vec();
        match binding.action() {
            Action::Function(name) => KeyEvent::Function {
                name: name.clone(),
                sequence,
            },
            Action::Macro(text) => KeyEvent::Macro {
                text: text.clone(),
                sequence,
            },
        }
    }

    /// Codepoints consumed by this event
    pub fn sequence(&self) -> &[char] {
        match self {
            KeyEvent::Function { sequence, .. } | KeyEvent::Macro { sequence, .. } => sequence,
            KeyEvent::Literal(c) => std::slice::from_ref(c),
        }
    }

    pub fn len(&self) -> usize {
        self.sequence().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn code_point_at(&self, index: usize) -> Option<char> {
        self.sequence().get(index).copied()
    }

    /// Bound function name, if any
    pub fn function(&self) -> Option<&str> {
        match self {
            KeyEvent::Function { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl std::fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyEvent::Function { name, sequence } => {
                write!(f, "{} {}", name, escape(sequence))
            }
            KeyEvent::Macro { text, sequence } => {
                write!(f, "macro {:?} {}", text, escape(sequence))
            }
            KeyEvent::Literal(c) => write!(f, "key:{}", *c as u32),
        }
    }
}

fn escape(sequence: &[char]) -> String {
    let mut out = String::from("\"");
    for c in sequence {
        match *c {
            '\x1b' => out.push_str("\\e"),
            c if (c as u32) < 0x20 => {
                out.push_str("\\C-");
                out.push(((c as u8) + b'@').to_ascii_lowercase() as char);
            }
            '\x7f' => out.push_str("\\d"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_sequence() {
        let event = KeyEvent::Literal('x');
        assert_eq!(event.sequence(), &['x']);
        assert_eq!(event.len(), 1);
        assert_eq!(event.code_point_at(0), Some('x'));
        assert_eq!(event.code_point_at(1), None);
        assert_eq!(event.function(), None);
    }

    #[test]
    fn test_display() {
        let event = KeyEvent::Function {
            name: "previous-history".to_string(),
            sequence: vec!['\x1b', '[', 'A'],
        };
        assert_eq!(event.to_string(), "previous-history \"\\e[A\"");

        let event = KeyEvent::Function {
            name: "beginning-of-line".to_string(),
            sequence: vec!['\x01'],
        };
        assert_eq!(event.to_string(), "beginning-of-line \"\\C-a\"");

        assert_eq!(KeyEvent::Literal('a').to_string(), "key:97");
    }
}
