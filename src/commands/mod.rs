//! Command classification module
//!
//! Maps a transcribed utterance to exactly one [`Intent`] using an ordered
//! table of substring rules. The first matching rule wins.

mod classifier;
mod intent;

pub use classifier::{classify, Rule, RULES};
pub use intent::Intent;
