//! Symbolic meaning of an utterance

use serde::{Deserialize, Serialize};

use crate::devices::Device;

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "device", rename_all = "snake_case")]
pub enum Intent {
    /// Switch a device on (no-op if already on)
    DeviceOn(Device),
    /// Switch a device off (no-op if already off)
    DeviceOff(Device),
    /// Flip a device unconditionally
    DeviceToggle(Device),
    /// Start the emergency countdown
    Emergency,
    /// Respond with a supportive message
    EmotionalSupport,
    /// Read out the command summary
    Help,
    /// Nothing matched
    Unknown,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Intent::DeviceOn(device) => write!(f, "DEVICE_ON({})", device),
            Intent::DeviceOff(device) => write!(f, "DEVICE_OFF({})", device),
            Intent::DeviceToggle(device) => write!(f, "DEVICE_TOGGLE({})", device),
            Intent::Emergency => write!(f, "EMERGENCY"),
            Intent::EmotionalSupport => write!(f, "EMOTIONAL_SUPPORT"),
            Intent::Help => write!(f, "HELP"),
            Intent::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_serialization() {
        let json = serde_json::to_string(&Intent::DeviceOn(Device::Fan)).unwrap();
        assert!(json.contains("device_on"));
        assert!(json.contains("fan"));
    }

    #[test]
    fn test_intent_display() {
        assert_eq!(Intent::DeviceToggle(Device::Music).to_string(), "DEVICE_TOGGLE(music)");
        assert_eq!(Intent::Emergency.to_string(), "EMERGENCY");
    }
}
