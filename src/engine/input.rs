//! Inputs accepted by the engine queue

use serde::{Deserialize, Serialize};

use crate::commands::Intent;
use crate::devices::Device;

/// Manual controls, one per button of the control panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManualCommand {
    ToggleLight,
    ToggleMusic,
    TriggerEmergency,
}

impl ManualCommand {
    /// The intent this control stands for. Manual controls skip classification.
    pub fn intent(self) -> Intent {
        match self {
            ManualCommand::ToggleLight => Intent::DeviceToggle(Device::Light),
            ManualCommand::ToggleMusic => Intent::DeviceToggle(Device::Music),
            ManualCommand::TriggerEmergency => Intent::Emergency,
        }
    }
}

/// Everything the engine can be asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineInput {
    /// Recognised speech, to be classified
    Utterance(String),
    /// A manual control was used
    Manual(ManualCommand),
    /// Status text from the voice listener
    ListenerStatus(String),
    /// One second of the emergency countdown elapsed
    EmergencyTick,
    /// The emergency contact attempt finished
    EmergencyContactFinished { contacted: bool },
}
