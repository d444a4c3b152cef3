//! Music playlist loading and track cursor

mod tracks;

pub use tracks::{MusicTrack, Playlist, AUDIO_EXTENSIONS};
