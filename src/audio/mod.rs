//! Audio playback port
//!
//! A backend loads a track, plays it and stops. Tracks are decoded from
//! MP3 or WAV. Without an output device (or without the `playback` feature)
//! the simulated backend is used and every track is reported as simulated.

mod backend;
mod decode;
#[cfg(feature = "playback")]
mod device;

pub use backend::{load_decoded, AudioBackend, AudioError, SimulatedBackend, TrackHandle};
pub use decode::{decode_file, Pcm};
#[cfg(test)]
pub(crate) use decode::write_tone;
#[cfg(feature = "playback")]
pub use device::DeviceBackend;
