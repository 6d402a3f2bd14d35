//! Key input handling
//!
//! Turns decoded input codepoints into key events using readline-style
//! bindings loaded from inputrc.

mod event;
pub mod inputrc;
mod keymap;
mod queue;

pub use event::KeyEvent;
pub use inputrc::{Diagnostic, DiagnosticKind};
pub use keymap::{Action, KeyBinding, KeySpec, Keymap, KeymapBuilder};
pub use queue::EventQueue;
