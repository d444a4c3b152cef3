//! Cosmetic emotional status shown alongside device state

use serde::{Deserialize, Serialize};

/// Emotional status of the user, display only.
///
/// Nothing in the engine changes it: the emotional support intent answers
/// with speech and leaves the status at `Neutral`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalState {
    #[default]
    Neutral,
    Happy,
    Sad,
    Stressed,
}

impl std::fmt::Display for EmotionalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmotionalState::Neutral => write!(f, "neutral"),
            EmotionalState::Happy => write!(f, "happy"),
            EmotionalState::Sad => write!(f, "sad"),
            EmotionalState::Stressed => write!(f, "stressed"),
        }
    }
}
