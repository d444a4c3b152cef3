//! Emergency escalation module
//!
//! A non-reentrant countdown that ends by contacting an emergency service:
//! - Idle: waiting for a trigger
//! - CountingDown(n): n seconds left, further triggers are ignored
//! - Completed: contact attempted, about to return to Idle

mod contact;
mod sequencer;

pub use contact::{ContactError, EmergencyContact, OpenerContact};
pub use sequencer::{EmergencySequencer, EmergencyState, Tick};
