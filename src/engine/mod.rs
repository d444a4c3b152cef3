//! Engine module
//!
//! The single consumer of all state-changing input. The voice listener, the
//! IPC server and the engine's own timers post [`EngineInput`]s to one queue;
//! the engine applies them one at a time.

mod input;
mod runner;

pub use input::{EngineInput, ManualCommand};
pub use runner::Engine;
