//! Countdown state machine
//!
//! The sequencer never sleeps. Something else (the engine's ticker task)
//! calls [`EmergencySequencer::tick`] once per second; the sequencer only
//! tracks where the countdown is and rejects re-entrant triggers.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Where the emergency sequence currently is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "remaining", rename_all = "snake_case")]
pub enum EmergencyState {
    #[default]
    Idle,
    CountingDown(u32),
    Completed,
}

impl std::fmt::Display for EmergencyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmergencyState::Idle => write!(f, "Idle"),
            EmergencyState::CountingDown(n) => write!(f, "CountingDown({})", n),
            EmergencyState::Completed => write!(f, "Completed"),
        }
    }
}

/// Result of advancing the countdown by one second
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still counting, this many seconds left
    Remaining(u32),
    /// Countdown hit zero: the emergency service must be contacted now
    Contact,
}

/// The single emergency sequence of the process
#[derive(Debug, Clone)]
pub struct EmergencySequencer {
    state: EmergencyState,
    countdown_secs: u32,
    contact_id: String,
}

impl EmergencySequencer {
    pub fn new(countdown_secs: u32, contact_id: impl Into<String>) -> Self {
        Self {
            state: EmergencyState::Idle,
            countdown_secs,
            contact_id: contact_id.into(),
        }
    }

    pub fn state(&self) -> EmergencyState {
        self.state
    }

    pub fn countdown_secs(&self) -> u32 {
        self.countdown_secs
    }

    /// Identifier handed to the emergency contact action
    pub fn contact_id(&self) -> &str {
        &self.contact_id
    }

    /// Arm the countdown. Returns `false` (and changes nothing) unless Idle.
    pub fn trigger(&mut self) -> bool {
        if self.state != EmergencyState::Idle {
            warn!(state = %self.state, "emergency already in progress, trigger ignored");
            return false;
        }

        info!(seconds = self.countdown_secs, "emergency countdown armed");
        self.state = EmergencyState::CountingDown(self.countdown_secs);
        true
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `None` for a tick that arrives outside an active countdown
    /// (or after zero was already reached).
    pub fn tick(&mut self) -> Option<Tick> {
        match self.state {
            EmergencyState::CountingDown(remaining) if remaining > 0 => {
                let remaining = remaining - 1;
                self.state = EmergencyState::CountingDown(remaining);
                debug!(remaining, "emergency countdown tick");

                if remaining == 0 {
                    Some(Tick::Contact)
                } else {
                    Some(Tick::Remaining(remaining))
                }
            }
            _ => None,
        }
    }

    /// Record that the contact attempt finished. Only valid at zero.
    pub fn complete(&mut self, contacted: bool) -> bool {
        if self.state != EmergencyState::CountingDown(0) {
            warn!(state = %self.state, "contact result outside countdown, ignored");
            return false;
        }

        info!(contacted, "emergency sequence completed");
        self.state = EmergencyState::Completed;
        true
    }

    /// Return to Idle after completion, permitting a new trigger
    pub fn reset(&mut self) -> bool {
        if self.state != EmergencyState::Completed {
            return false;
        }
        self.state = EmergencyState::Idle;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequencer() -> EmergencySequencer {
        EmergencySequencer::new(5, "tel:112")
    }

    #[test]
    fn test_initial_state() {
        assert_eq!(sequencer().state(), EmergencyState::Idle);
    }

    #[test]
    fn test_full_cycle() {
        let mut seq = sequencer();

        assert!(seq.trigger());
        assert_eq!(seq.state(), EmergencyState::CountingDown(5));

        for expected in (1..5).rev() {
            assert_eq!(seq.tick(), Some(Tick::Remaining(expected)));
            assert_eq!(seq.state(), EmergencyState::CountingDown(expected));
        }

        assert_eq!(seq.tick(), Some(Tick::Contact));
        assert_eq!(seq.state(), EmergencyState::CountingDown(0));

        assert!(seq.complete(true));
        assert_eq!(seq.state(), EmergencyState::Completed);

        assert!(seq.reset());
        assert_eq!(seq.state(), EmergencyState::Idle);

        // A new trigger after completion succeeds
        assert!(seq.trigger());
        assert_eq!(seq.state(), EmergencyState::CountingDown(5));
    }

    #[test]
    fn test_reentrant_trigger_ignored() {
        let mut seq = sequencer();
        assert!(seq.trigger());
        seq.tick();

        assert!(!seq.trigger());
        assert_eq!(seq.state(), EmergencyState::CountingDown(4));
    }

    #[test]
    fn test_trigger_ignored_while_completed() {
        let mut seq = sequencer();
        seq.trigger();
        while seq.tick().is_some() {}
        seq.complete(false);

        assert!(!seq.trigger());
        assert_eq!(seq.state(), EmergencyState::Completed);
    }

    #[test]
    fn test_stale_ticks_ignored() {
        let mut seq = sequencer();
        assert_eq!(seq.tick(), None);

        seq.trigger();
        while seq.tick().is_some() {}
        assert_eq!(seq.tick(), None);
        assert_eq!(seq.state(), EmergencyState::CountingDown(0));
    }

    #[test]
    fn test_complete_requires_zero() {
        let mut seq = sequencer();
        assert!(!seq.complete(true));

        seq.trigger();
        assert!(!seq.complete(true));
        assert_eq!(seq.state(), EmergencyState::CountingDown(5));
        assert!(!seq.reset());
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&EmergencyState::CountingDown(3)).unwrap();
        assert!(json.contains("counting_down"));
        assert!(json.contains('3'));

        let idle: EmergencyState = serde_json::from_str(r#"{"state":"idle"}"#).unwrap();
        assert_eq!(idle, EmergencyState::Idle);
    }
}
