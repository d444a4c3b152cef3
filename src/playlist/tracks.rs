//! Playlist built from a music directory
//!
//! Tracks are immutable once loaded. A track with an empty path is valid and
//! always plays as simulated playback.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

/// File extensions recognised as audio
pub const AUDIO_EXTENSIONS: [&str; 3] = ["mp3", "wav", "m4a"];

/// Placeholder tracks used when no audio file is available
const PLACEHOLDER_TRACKS: [&str; 2] = ["Tum Hi Ho - Aashiqui", "Sunn Raha Hai - Aashiqui"];

/// A single playable track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MusicTrack {
    path: PathBuf,
    display_name: String,
}

impl MusicTrack {
    pub fn new(path: impl Into<PathBuf>, display_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            display_name: display_name.into(),
        }
    }

    /// A track with no backing file
    pub fn placeholder(display_name: impl Into<String>) -> Self {
        Self::new(PathBuf::new(), display_name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Whether this track has a file path at all
    pub fn has_file(&self) -> bool {
        !self.path.as_os_str().is_empty()
    }

    fn from_file(path: PathBuf) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if !AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            return None;
        }
        let display_name = path.file_stem()?.to_str()?.replace(['-', '_'], " ");
        Some(Self::new(path, display_name))
    }
}

/// Ordered list of tracks with a current position
#[derive(Debug, Clone)]
pub struct Playlist {
    tracks: Vec<MusicTrack>,
    current: usize,
}

impl Playlist {
    /// Build a playlist from explicit tracks, falling back to placeholders when empty
    pub fn new(tracks: Vec<MusicTrack>) -> Self {
        let tracks = if tracks.is_empty() {
            PLACEHOLDER_TRACKS
                .iter()
                .map(|name| MusicTrack::placeholder(*name))
                .collect()
        } else {
            tracks
        };

        Self { tracks, current: 0 }
    }

    /// Load every audio file in `dir`, sorted by file name.
    ///
    /// A missing or unreadable directory is not an error: the playlist is
    /// filled with placeholder tracks instead.
    pub fn load(dir: &Path) -> Self {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(?dir, error = %e, "music directory unavailable, using placeholder tracks");
                return Self::new(Vec::new());
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        let tracks: Vec<MusicTrack> = paths.into_iter().filter_map(MusicTrack::from_file).collect();

        if tracks.is_empty() {
            info!(?dir, "no audio files found, using placeholder tracks");
        } else {
            info!(?dir, count = tracks.len(), "playlist loaded");
        }
        for track in &tracks {
            debug!(name = track.display_name(), path = ?track.path(), "track");
        }

        Self::new(tracks)
    }

    #[cfg(test)]
    pub(crate) fn tracks(&self) -> &[MusicTrack] {
        &self.tracks
    }

    /// The track that plays when music is switched on
    pub fn current(&self) -> Option<&MusicTrack> {
        self.tracks.get(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_directory_uses_placeholders() {
        let playlist = Playlist::load(Path::new("/nonexistent/voicehome/music"));
        assert_eq!(playlist.tracks().len(), 2);

        let current = playlist.current().unwrap();
        assert_eq!(current.display_name(), "Tum Hi Ho - Aashiqui");
        assert!(!current.has_file());
    }

    #[test]
    fn test_load_filters_and_names_tracks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b_second-song.MP3"), b"").unwrap();
        std::fs::write(dir.path().join("a-first_song.wav"), b"").unwrap();
        std::fs::write(dir.path().join("cover.jpg"), b"").unwrap();
        std::fs::write(dir.path().join("notes"), b"").unwrap();

        let playlist = Playlist::load(dir.path());
        let names: Vec<&str> = playlist.tracks().iter().map(|t| t.display_name()).collect();

        assert_eq!(names, vec!["a first song", "b second song"]);
        assert!(playlist.current().unwrap().has_file());
    }

    #[test]
    fn test_empty_directory_uses_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let playlist = Playlist::load(dir.path());
        assert_eq!(playlist.tracks().len(), 2);
        assert!(playlist.tracks().iter().all(|t| !t.has_file()));
    }
}
