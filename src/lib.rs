//! voicehome: voice-controlled smart home panel
//!
//! Maps spoken or manually-triggered commands to simulated household devices
//! (light, fan, music) and an emergency alert, with spoken feedback.
//!
//! Input flows through one queue:
//! - `listener` turns recognised speech into engine input
//! - `ipc` turns manual controls into engine input
//! - `engine` classifies (`commands`), dispatches (`dispatch`) and reports
//!   the result as `events` and speech

pub mod audio;
pub mod commands;
pub mod config;
pub mod devices;
pub mod dispatch;
pub mod emergency;
pub mod engine;
pub mod events;
pub mod ipc;
pub mod lifecycle;
pub mod listener;
pub mod playlist;
pub mod speech;

pub use config::Config;
