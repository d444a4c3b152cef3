//! Configuration loading and management

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// Directory scanned for music tracks
    pub music_dir: PathBuf,

    /// Identifier handed to the emergency contact program (e.g. a `tel:` URI)
    pub emergency_contact: String,

    /// Program that opens the emergency contact identifier
    pub contact_command: String,

    /// External TTS command line; `None` prints speech to the console
    pub tts_command: Option<String>,

    /// Seconds counted down before the emergency contact is made
    pub countdown_secs: u32,

    /// Cadence of the emergency countdown
    pub tick_interval: Duration,

    /// Longest wait for a single utterance
    pub listen_timeout: Duration,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = match lookup("VOICEHOME_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => {
                let home = lookup("HOME").context("HOME is not set")?;
                PathBuf::from(home)
                    .join(".local")
                    .join("share")
                    .join("voicehome")
            }
        };

        let socket_path = lookup("VOICEHOME_SOCKET")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("daemon.sock"));

        let music_dir = lookup("VOICEHOME_MUSIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("music"));

        let emergency_contact =
            lookup("VOICEHOME_EMERGENCY_CONTACT").unwrap_or_else(|| "tel:112".to_string());
        let contact_command =
            lookup("VOICEHOME_CONTACT_COMMAND").unwrap_or_else(|| "xdg-open".to_string());
        let tts_command = lookup("VOICEHOME_TTS_COMMAND").filter(|cmd| !cmd.trim().is_empty());

        let countdown_secs: u32 = parse_var(&lookup, "VOICEHOME_COUNTDOWN_SECS", 5)?;
        let tick_ms: u64 = parse_var(&lookup, "VOICEHOME_TICK_MS", 1000)?;
        let listen_timeout_secs: u64 = parse_var(&lookup, "VOICEHOME_LISTEN_TIMEOUT_SECS", 8)?;

        if tick_ms == 0 {
            bail!("VOICEHOME_TICK_MS must be greater than zero");
        }
        if listen_timeout_secs == 0 {
            bail!("VOICEHOME_LISTEN_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Self {
            socket_path,
            data_dir,
            music_dir,
            emergency_contact,
            contact_command,
            tts_command,
            countdown_secs,
            tick_interval: Duration::from_millis(tick_ms),
            listen_timeout: Duration::from_secs(listen_timeout_secs),
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("HOME", "/home/tester")]).unwrap();
        assert_eq!(
            config.socket_path,
            PathBuf::from("/home/tester/.local/share/voicehome/daemon.sock")
        );
        assert_eq!(config.countdown_secs, 5);
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.listen_timeout, Duration::from_secs(8));
        assert_eq!(config.contact_command, "xdg-open");
        assert!(config.tts_command.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("VOICEHOME_DATA_DIR", "/tmp/vh"),
            ("VOICEHOME_COUNTDOWN_SECS", "3"),
            ("VOICEHOME_TTS_COMMAND", "espeak -s 150"),
            ("VOICEHOME_EMERGENCY_CONTACT", "tel:911"),
        ])
        .unwrap();
        assert_eq!(config.socket_path, PathBuf::from("/tmp/vh/daemon.sock"));
        assert_eq!(config.countdown_secs, 3);
        assert_eq!(config.tts_command.as_deref(), Some("espeak -s 150"));
        assert_eq!(config.emergency_contact, "tel:911");
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let err = config_from(&[("HOME", "/h"), ("VOICEHOME_COUNTDOWN_SECS", "five")]).unwrap_err();
        assert!(err.to_string().contains("VOICEHOME_COUNTDOWN_SECS"));
    }

    #[test]
    fn test_zero_tick_rejected() {
        assert!(config_from(&[("HOME", "/h"), ("VOICEHOME_TICK_MS", "0")]).is_err());
    }

    #[test]
    fn test_missing_home() {
        assert!(config_from(&[]).is_err());
    }
}
