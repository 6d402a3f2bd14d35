//! Mochi TTY Library
//!
//! The input/output pipeline of a terminal session, sitting between a
//! transport that delivers raw bytes (for example an SSH channel) and a line
//! editor that consumes key events:
//!
//! - `io`: streaming charset decoder and output encoder
//! - `readline`: inputrc parsing, keymaps, and the key event queue
//! - `tty`: onlcr output normalization and the per-connection session
//! - `app`: configuration

pub mod app;
pub mod error;
pub mod io;
pub mod readline;
pub mod tty;

pub use error::{DecodeError, Error, Result};
