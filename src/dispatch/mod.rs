//! Action dispatch module
//!
//! Applies an [`Intent`](crate::commands::Intent) to the home state and
//! describes the resulting feedback as a list of [`Effect`]s for the engine
//! to carry out.

mod dispatcher;
mod effect;
mod emotion;
pub mod messages;

pub use dispatcher::Dispatcher;
pub use effect::Effect;
pub use emotion::EmotionalState;
