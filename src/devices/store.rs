//! Binary device state store
//!
//! The store is plain data. Every change goes through [`DeviceStore::set_state`],
//! which reports the transition together with the text to speak for it.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// The closed set of controllable devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    Light,
    Fan,
    Music,
}

impl Device {
    /// All devices, in display order
    pub const ALL: [Device; 3] = [Device::Light, Device::Fan, Device::Music];

    fn index(self) -> usize {
        match self {
            Device::Light => 0,
            Device::Fan => 1,
            Device::Music => 2,
        }
    }

    /// Feedback text for a device that has just switched to `on`
    pub fn notice(self, on: bool) -> &'static str {
        match (self, on) {
            (Device::Light, true) => "Light turned on",
            (Device::Light, false) => "Light turned off",
            (Device::Fan, true) => "Fan turned on",
            (Device::Fan, false) => "Fan turned off",
            (Device::Music, true) => "Music started",
            (Device::Music, false) => "Music stopped",
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Device::Light => write!(f, "light"),
            Device::Fan => write!(f, "fan"),
            Device::Music => write!(f, "music"),
        }
    }
}

/// Result of a [`DeviceStore::set_state`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub device: Device,
    pub previous: bool,
    pub current: bool,
}

impl Transition {
    /// Whether the call actually changed the state
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }

    /// Text to speak for this transition, `None` when nothing changed
    pub fn notice(&self) -> Option<&'static str> {
        self.changed().then(|| self.device.notice(self.current))
    }
}

/// On/off state for every [`Device`], all off at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceStore {
    states: [bool; 3],
}

impl DeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_state(&self, device: Device) -> bool {
        self.states[device.index()]
    }

    /// Set a device state, returning the transition (with its previous value)
    pub fn set_state(&mut self, device: Device, on: bool) -> Transition {
        let slot = &mut self.states[device.index()];
        let previous = std::mem::replace(slot, on);

        if previous != on {
            debug!(%device, from = previous, to = on, "device state changed");
        }

        Transition {
            device,
            previous,
            current: on,
        }
    }
}
