//! Text-to-speech output

use std::process::Command;

use tracing::debug;

/// Errors that can occur while speaking
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("failed to run TTS command: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("TTS command exited with {0}")]
    ExitStatus(std::process::ExitStatus),

    #[error("TTS command is empty")]
    EmptyCommand,
}

/// Speaks text. Implementations may block until playback finishes.
pub trait Speaker: Send + Sync {
    fn speak(&self, text: &str) -> Result<(), SpeechError>;
}

/// Prints spoken text to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSpeaker;

impl Speaker for ConsoleSpeaker {
    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        println!("🔊 {}", text);
        Ok(())
    }
}

/// Runs an external TTS program (e.g. `espeak -s 150`) with the text as last argument
#[derive(Debug, Clone)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
}

impl CommandSpeaker {
    /// Parse a whitespace-separated command line
    pub fn parse(command_line: &str) -> Result<Self, SpeechError> {
        let mut parts = command_line.split_whitespace().map(str::to_owned);
        let program = parts.next().ok_or(SpeechError::EmptyCommand)?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        debug!(program = %self.program, text, "running TTS command");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(SpeechError::ExitStatus(status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_line() {
        let speaker = CommandSpeaker::parse("espeak -s 150").unwrap();
        assert_eq!(speaker.program(), "espeak");
        assert_eq!(speaker.args, vec!["-s", "150"]);
    }

    #[test]
    fn test_parse_empty_command() {
        assert!(matches!(
            CommandSpeaker::parse("   "),
            Err(SpeechError::EmptyCommand)
        ));
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let speaker = CommandSpeaker::parse("voicehome-no-such-tts-program").unwrap();
        assert!(matches!(speaker.speak("hello"), Err(SpeechError::Spawn(_))));
    }
}
