//! Speech-to-text input
//!
//! Timeouts and unintelligible input are steady-state outcomes: the listener
//! keeps going after either.

use std::io::BufRead;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::debug;

/// Outcomes of a transcription attempt other than recognised text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranscribeError {
    #[error("no speech before timeout")]
    Timeout,

    #[error("could not understand audio")]
    Unintelligible,

    #[error("recognition service unavailable: {0}")]
    Network(String),

    #[error("input source closed")]
    Closed,
}

/// Supplies utterances. Blocks for at most `timeout`.
pub trait Transcriber: Send {
    fn transcribe(&mut self, timeout: Duration) -> Result<String, TranscribeError>;
}

/// Treats each line of a text source as one recognised utterance.
///
/// A blank line counts as unintelligible audio. End of input closes the
/// transcriber.
pub struct LineTranscriber {
    lines: mpsc::Receiver<String>,
}

impl LineTranscriber {
    /// Read lines from `reader` on a helper thread
    pub fn new<R>(reader: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();

        // The helper thread ends at EOF or once the receiver is dropped
        let spawned = thread::Builder::new()
            .name("line-transcriber".to_string())
            .spawn(move || {
                for line in reader.lines() {
                    let Ok(line) = line else { break };
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                debug!("line source exhausted");
            });

        if let Err(e) = spawned {
            tracing::error!(error = %e, "failed to spawn line reader thread");
        }

        Self { lines: rx }
    }

    /// Read utterances typed on standard input
    pub fn stdin() -> Self {
        Self::new(std::io::BufReader::new(std::io::stdin()))
    }
}

impl Transcriber for LineTranscriber {
    fn transcribe(&mut self, timeout: Duration) -> Result<String, TranscribeError> {
        match self.lines.recv_timeout(timeout) {
            Ok(line) => {
                let text = line.trim();
                if text.is_empty() {
                    Err(TranscribeError::Unintelligible)
                } else {
                    Ok(text.to_lowercase())
                }
            }
            Err(RecvTimeoutError::Timeout) => Err(TranscribeError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(TranscribeError::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_lines_become_lowercase_utterances() {
        let mut transcriber = LineTranscriber::new(Cursor::new("Turn On Light\n\nfan\n"));

        assert_eq!(transcriber.transcribe(TIMEOUT), Ok("turn on light".to_string()));
        assert_eq!(transcriber.transcribe(TIMEOUT), Err(TranscribeError::Unintelligible));
        assert_eq!(transcriber.transcribe(TIMEOUT), Ok("fan".to_string()));
        assert_eq!(transcriber.transcribe(TIMEOUT), Err(TranscribeError::Closed));
    }

    #[test]
    fn test_timeout_when_no_input() {
        let (_keep_open, rx) = mpsc::channel::<String>();
        let mut transcriber = LineTranscriber { lines: rx };
        assert_eq!(
            transcriber.transcribe(Duration::from_millis(10)),
            Err(TranscribeError::Timeout)
        );
    }
}
