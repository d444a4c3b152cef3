//! Speech module
//!
//! Ports for the two opaque speech services:
//! - `Transcriber`: recognised text from the microphone (or any line source)
//! - `Speaker`: text-to-speech output
//!
//! plus the worker that delivers spoken feedback in order without blocking
//! the engine.

mod speaker;
mod transcriber;
mod worker;

pub use speaker::{CommandSpeaker, ConsoleSpeaker, SpeechError, Speaker};
pub use transcriber::{LineTranscriber, TranscribeError, Transcriber};
pub use worker::spawn_speech_worker;
