//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::devices::Device;
use crate::dispatch::EmotionalState;
use crate::emergency::EmergencyState;
use crate::engine::ManualCommand;
use crate::events::EngineEvent;

/// Largest accepted message body
pub const MAX_MESSAGE_LEN: usize = 1024 * 1024;

/// Requests from a client to the daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Request current daemon status
    GetStatus,

    /// Ping to check connectivity
    Ping,

    /// Subscribe to engine event notifications
    Subscribe,

    /// Manual control: flip the light
    ToggleLight,

    /// Manual control: flip the music
    ToggleMusic,

    /// Manual control: start the emergency countdown
    TriggerEmergency,
}

/// Messages from the daemon to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Current daemon status
    Status(DaemonStatus),

    /// Pong response to ping
    Pong,

    /// Subscription confirmed
    Subscribed,

    /// Manual command queued for the engine
    Accepted { command: ManualCommand },

    /// Pushed to subscribed clients for every engine event
    Event { event: EngineEvent },

    /// Error response
    Error { code: String, message: String },
}

impl Response {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Response::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// On/off state of every device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub light: bool,
    pub fan: bool,
    pub music: bool,
}

impl DeviceStatus {
    fn set(&mut self, device: Device, on: bool) {
        match device {
            Device::Light => self.light = on,
            Device::Fan => self.fan = on,
            Device::Music => self.music = on,
        }
    }
}

/// Full daemon status snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Device states
    pub devices: DeviceStatus,

    /// Emergency sequence state
    pub emergency: EmergencyState,

    /// Emotional status (display only)
    pub emotion: EmotionalState,

    /// Now-playing line
    pub now_playing: String,

    /// Latest status line
    pub display: String,

    /// Whether voice input is active
    pub listening: bool,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

impl Default for DaemonStatus {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            devices: DeviceStatus::default(),
            emergency: EmergencyState::default(),
            emotion: EmotionalState::default(),
            now_playing: "Say 'play music' to start".to_string(),
            display: String::new(),
            listening: false,
            uptime_secs: 0,
        }
    }
}

impl DaemonStatus {
    /// Fold an engine event into the snapshot
    pub fn apply(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::Display { text } | EngineEvent::Spoke { text } => {
                self.display = text.clone();
            }
            EngineEvent::Classified { .. } => {}
            EngineEvent::DeviceChanged { device, on } => self.devices.set(*device, *on),
            EngineEvent::NowPlaying { text } => self.now_playing = text.clone(),
            EngineEvent::EmergencyChanged { state } => self.emergency = *state,
        }
    }
}

/// Write one length-prefixed JSON message
pub async fn send_message<W, T>(writer: &mut W, msg: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let msg_bytes = serde_json::to_vec(msg)?;
    let msg_len = u32::try_from(msg_bytes.len())
        .context("message too large")?
        .to_le_bytes();

    writer.write_all(&msg_len).await?;
    writer.write_all(&msg_bytes).await?;
    writer.flush().await?;

    Ok(())
}

/// Read one length-prefixed JSON message. `Ok(None)` on a clean disconnect.
pub async fn read_message<R, T>(reader: &mut R) -> Result<Option<T>>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_LEN {
        bail!("message too large: {} bytes", len);
    }

    let mut msg_buf = vec![0u8; len];
    reader.read_exact(&mut msg_buf).await?;

    let msg = serde_json::from_slice(&msg_buf).context("failed to parse message")?;
    Ok(Some(msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let json = serde_json::to_string(&Request::ToggleLight).unwrap();
        assert_eq!(json, r#"{"type":"toggle_light"}"#);
    }

    #[test]
    fn test_response_serialization() {
        let resp = Response::Status(DaemonStatus::default());
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("status"));

        let resp = Response::Accepted {
            command: ManualCommand::ToggleMusic,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("accepted"));
        assert!(json.contains("toggle_music"));
    }

    #[test]
    fn test_status_applies_events() {
        let mut status = DaemonStatus::default();
        status.apply(&EngineEvent::DeviceChanged {
            device: Device::Fan,
            on: true,
        });
        status.apply(&EngineEvent::NowPlaying {
            text: "Simulating: song".to_string(),
        });
        status.apply(&EngineEvent::EmergencyChanged {
            state: EmergencyState::CountingDown(3),
        });
        status.apply(&EngineEvent::Spoke {
            text: "Fan turned on".to_string(),
        });

        assert!(status.devices.fan);
        assert!(!status.devices.light);
        assert_eq!(status.now_playing, "Simulating: song");
        assert_eq!(status.emergency, EmergencyState::CountingDown(3));
        assert_eq!(status.display, "Fan turned on");
        assert_eq!(status.emotion, EmotionalState::Neutral);
    }

    #[tokio::test]
    async fn test_framing() {
        let (mut client, mut server) = tokio::io::duplex(1024);

        send_message(&mut client, &Request::Ping).await.unwrap();
        drop(client);

        let received: Option<Request> = read_message(&mut server).await.unwrap();
        assert_eq!(received, Some(Request::Ping));

        let eof: Option<Request> = read_message(&mut server).await.unwrap();
        assert_eq!(eof, None);
    }

    #[tokio::test]
    async fn test_oversized_message_rejected() {
        let mut reader = tokio_test::io::Builder::new()
            .read(&(MAX_MESSAGE_LEN as u32 + 1).to_le_bytes())
            .build();

        let result: Result<Option<Request>> = read_message(&mut reader).await;
        assert!(result.is_err());
    }
}
