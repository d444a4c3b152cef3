//! Side effects requested by the dispatcher

use crate::devices::Device;
use crate::emergency::EmergencyState;

/// Something the engine must do after a dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Speak the text (and show it)
    Speak(String),
    /// Show a status line without speaking it
    Display(String),
    /// A device changed state
    DeviceChanged { device: Device, on: bool },
    /// The now-playing line changed
    NowPlaying(String),
    /// The emergency sequence moved to a new state
    EmergencyChanged(EmergencyState),
    /// Start delivering one-second countdown ticks
    StartCountdown,
    /// Countdown reached zero: contact the emergency service
    ContactEmergency(String),
}
