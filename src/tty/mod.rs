//! TTY session plumbing
//!
//! - `output`: onlcr output line discipline
//! - `session`: per-connection input/output pipeline

mod output;
mod session;

pub use output::{onlcr, onlcr_chunks, OutputMode};
pub use session::TtySession;
