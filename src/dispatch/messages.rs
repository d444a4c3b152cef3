//! Fixed user-facing texts

pub const WELCOME: &str = "Welcome! Say 'light on', 'play music', or 'help' for commands.";

pub const HELP: &str = "Say: Light on, Play music, Emergency, or I'm sad";

pub const UNKNOWN: &str = "Try: Light on, Play music, or Emergency";

pub const SUPPORTIVE_MESSAGES: [&str; 5] = [
    "I'm here for you. Would you like to talk about what's bothering you?",
    "You're not alone. I'm always here to listen to you.",
    "It's okay to feel sad sometimes. Remember that this feeling will pass.",
    "Would you like me to play some calming music to help you feel better?",
    "I care about how you're feeling. Is there anything I can do to help?",
];

pub const HELP_ON_THE_WAY: &str = "Help is on the way!";

pub const CALL_MANUALLY: &str = "Please call emergency services manually!";

pub const EMERGENCY_DONE: &str = "Emergency call completed";

pub const MUSIC_STOPPED: &str = "Music stopped";

pub const LISTENING: &str = "Listening... Speak now";

pub const UNINTELLIGIBLE: &str = "Could not understand audio";

pub const NO_NETWORK: &str = "Internet required for voice commands";

pub const VOICE_UNAVAILABLE: &str = "Voice input not available - use manual controls";

pub fn emergency_warning(seconds: u32) -> String {
    format!("Emergency! Calling for help in {} seconds.", seconds)
}

pub fn emergency_countdown(seconds: u32) -> String {
    format!("EMERGENCY: Calling in {} seconds...", seconds)
}

pub fn heard(utterance: &str) -> String {
    format!("Command: {}", utterance)
}

pub fn playing(track: &str) -> String {
    format!("Playing: {}", track)
}

pub fn simulating(track: &str) -> String {
    format!("Simulating: {}", track)
}
