//! Ordered substring rule table
//!
//! Precedence, per device family: explicit on phrase, explicit off phrase,
//! bare family name (toggle). Families are tested light, fan, music, then
//! emergency, emotional support and help. Matching is plain substring
//! containment on the lowercased utterance.

use tracing::debug;

use super::intent::Intent;
use crate::devices::Device;

/// One row of the rule table
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub phrases: &'static [&'static str],
    pub intent: Intent,
}

impl Rule {
    const fn new(phrases: &'static [&'static str], intent: Intent) -> Self {
        Self { phrases, intent }
    }

    /// Whether any phrase of this rule occurs in `utterance`
    pub fn matches(&self, utterance: &str) -> bool {
        self.phrases.iter().any(|phrase| utterance.contains(phrase))
    }
}

/// The rule table, in evaluation order.
///
/// The trailing `help` rule can never fire because the emergency rule already
/// claims `help`; it stays so the table mirrors the observable precedence.
pub const RULES: &[Rule] = &[
    // Light
    Rule::new(
        &["light on", "turn on light", "switch on light"],
        Intent::DeviceOn(Device::Light),
    ),
    Rule::new(
        &["light off", "turn off light", "switch off light"],
        Intent::DeviceOff(Device::Light),
    ),
    Rule::new(&["light"], Intent::DeviceToggle(Device::Light)),
    // Fan
    Rule::new(&["fan on", "turn on fan"], Intent::DeviceOn(Device::Fan)),
    Rule::new(&["fan off", "turn off fan"], Intent::DeviceOff(Device::Fan)),
    Rule::new(&["fan"], Intent::DeviceToggle(Device::Fan)),
    // Music
    Rule::new(
        &["play music", "music on", "start music"],
        Intent::DeviceOn(Device::Music),
    ),
    Rule::new(
        &["stop music", "music off", "end music"],
        Intent::DeviceOff(Device::Music),
    ),
    Rule::new(&["music"], Intent::DeviceToggle(Device::Music)),
    // Emergency
    Rule::new(
        &["emergency", "help", "save me", "accident"],
        Intent::Emergency,
    ),
    // Emotional support
    Rule::new(
        &["sad", "unhappy", "depressed", "lonely"],
        Intent::EmotionalSupport,
    ),
    Rule::new(&["help"], Intent::Help),
];

/// Classify an utterance. Case is folded before matching.
pub fn classify(utterance: &str) -> Intent {
    let folded = utterance.to_lowercase();

    let intent = RULES
        .iter()
        .find(|rule| rule.matches(&folded))
        .map(|rule| rule.intent)
        .unwrap_or(Intent::Unknown);

    debug!(utterance = %folded, %intent, "utterance classified");
    intent
}
