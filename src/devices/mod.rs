//! Device state module
//!
//! Holds the on/off state of every controllable device:
//! - Light
//! - Fan
//! - Music (logical state only, playback lives in `dispatch`)

mod store;

pub use store::{Device, DeviceStore, Transition};
