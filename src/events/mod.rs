//! Events module for observers of the engine
//!
//! Every visible change (status line, speech, device state, playback,
//! emergency progress) is broadcast as an [`EngineEvent`] so the IPC server
//! and any subscribed client can render it.

use serde::{Deserialize, Serialize};

use crate::commands::Intent;
use crate::devices::Device;
use crate::emergency::EmergencyState;

/// Events emitted by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Status line changed
    Display { text: String },

    /// Text handed to the speaker (also shown)
    Spoke { text: String },

    /// An utterance was classified
    Classified { utterance: String, intent: Intent },

    /// A device switched on or off
    DeviceChanged { device: Device, on: bool },

    /// The now-playing line changed
    NowPlaying { text: String },

    /// The emergency sequence changed state
    EmergencyChanged { state: EmergencyState },
}

impl std::fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineEvent::Display { text } => write!(f, "DISPLAY {}", text),
            EngineEvent::Spoke { text } => write!(f, "SPOKE {}", text),
            EngineEvent::Classified { utterance, intent } => {
                write!(f, "CLASSIFIED \"{}\" -> {}", utterance, intent)
            }
            EngineEvent::DeviceChanged { device, on } => {
                write!(f, "DEVICE {} {}", device, if *on { "ON" } else { "OFF" })
            }
            EngineEvent::NowPlaying { text } => write!(f, "NOW_PLAYING {}", text),
            EngineEvent::EmergencyChanged { state } => write!(f, "EMERGENCY {}", state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = EngineEvent::DeviceChanged {
            device: Device::Light,
            on: true,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("device_changed"));
        assert!(json.contains("light"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"emergency_changed","state":{"state":"counting_down","remaining":2}}"#;
        let event: EngineEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            EngineEvent::EmergencyChanged {
                state: EmergencyState::CountingDown(2)
            }
        );
    }

    #[test]
    fn test_event_display() {
        let event = EngineEvent::DeviceChanged {
            device: Device::Fan,
            on: false,
        };
        assert_eq!(event.to_string(), "DEVICE fan OFF");
    }
}
