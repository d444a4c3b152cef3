//! Voice listener module
//!
//! Runs the blocking transcribe loop on a dedicated thread and feeds the
//! engine queue.

mod voice;

pub use voice::{ListenerError, VoiceListener};
