//! Audio backend trait and the simulated backend

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::decode::{decode_file, Pcm};
use crate::playlist::AUDIO_EXTENSIONS;

/// Handle to a loaded track
#[derive(Debug, Clone, PartialEq)]
pub struct TrackHandle {
    path: PathBuf,
    pcm: Option<Arc<Pcm>>,
}

impl TrackHandle {
    /// A handle that carries no decoded audio
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pcm: None,
        }
    }

    pub fn decoded(path: impl Into<PathBuf>, pcm: Pcm) -> Self {
        Self {
            path: path.into(),
            pcm: Some(Arc::new(pcm)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pcm(&self) -> Option<&Arc<Pcm>> {
        self.pcm.as_ref()
    }
}

/// Errors that can occur while loading or playing a track
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("track has no audio file")]
    NoFile,

    #[error("audio file not found: {0}")]
    NotFound(PathBuf),

    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("no audio output available")]
    NoOutput,

    #[error("playback backend error: {0}")]
    Backend(String),
}

/// Playback backend used by the dispatcher
pub trait AudioBackend: Send {
    /// Load a track, failing when it is unavailable
    fn load_track(&mut self, path: &Path) -> Result<TrackHandle, AudioError>;

    /// Start playing a loaded track
    fn play(&mut self, handle: &TrackHandle, looped: bool) -> Result<(), AudioError>;

    /// Stop playback. Safe to call when nothing is playing.
    fn stop(&mut self);
}

/// Check that `path` names an existing file of a playlist format and decode it
pub fn load_decoded(path: &Path) -> Result<TrackHandle, AudioError> {
    if path.as_os_str().is_empty() {
        return Err(AudioError::NoFile);
    }
    if !path.is_file() {
        return Err(AudioError::NotFound(path.to_owned()));
    }

    let supported = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    if !supported {
        return Err(AudioError::UnsupportedFormat(path.to_owned()));
    }

    let pcm = decode_file(path)?;
    debug!(?path, "track loaded");
    Ok(TrackHandle::decoded(path, pcm))
}

/// Backend for hosts without audio output.
///
/// Tracks are still loaded and decoded, but `play` always fails with
/// [`AudioError::NoOutput`] so callers report simulated playback.
#[derive(Debug, Default)]
pub struct SimulatedBackend;

impl SimulatedBackend {
    pub fn new() -> Self {
        Self
    }
}

impl AudioBackend for SimulatedBackend {
    fn load_track(&mut self, path: &Path) -> Result<TrackHandle, AudioError> {
        load_decoded(path)
    }

    fn play(&mut self, handle: &TrackHandle, looped: bool) -> Result<(), AudioError> {
        info!(path = ?handle.path(), looped, "no audio output, simulating playback");
        Err(AudioError::NoOutput)
    }

    fn stop(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::decode::write_tone;

    #[test]
    fn test_empty_path_is_unavailable() {
        assert!(matches!(load_decoded(Path::new("")), Err(AudioError::NoFile)));
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let result = load_decoded(Path::new("/nonexistent/song.mp3"));
        assert!(matches!(result, Err(AudioError::NotFound(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.png");
        std::fs::write(&path, b"").unwrap();

        assert!(matches!(
            load_decoded(&path),
            Err(AudioError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_non_audio_bytes_do_not_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.mp3");
        std::fs::write(&path, b"not audio at all").unwrap();

        let mut backend = SimulatedBackend::new();
        assert!(matches!(
            backend.load_track(&path),
            Err(AudioError::Backend(_))
        ));
    }

    #[test]
    fn test_simulated_backend_loads_but_never_plays() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_tone(&path, 800);

        let mut backend = SimulatedBackend::new();
        let handle = backend.load_track(&path).unwrap();
        assert_eq!(handle.path(), path.as_path());
        assert_eq!(handle.pcm().map(|pcm| pcm.samples.len()), Some(800));

        assert!(matches!(
            backend.play(&handle, true),
            Err(AudioError::NoOutput)
        ));

        // Stopping with nothing playing is harmless
        backend.stop();
    }
}
