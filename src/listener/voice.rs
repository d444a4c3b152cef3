//! Continuous listen loop
//!
//! Each iteration asks the transcriber for one utterance. Recognised text is
//! posted to the engine; timeouts and recognition failures only update the
//! status line. A stop flag is checked every iteration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dispatch::messages;
use crate::engine::EngineInput;
use crate::speech::{TranscribeError, Transcriber};

/// Errors that can occur when starting the listener
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("voice listener is already running")]
    AlreadyRunning,

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),
}

/// Listens for utterances and forwards them to the engine
pub struct VoiceListener {
    input_tx: mpsc::Sender<EngineInput>,
    /// Flag of the current run. Each start gets a fresh flag so a stopped
    /// thread still inside `transcribe` can never be revived.
    running: Arc<AtomicBool>,
    timeout: Duration,
}

impl VoiceListener {
    /// Create a listener that waits at most `timeout` per utterance
    pub fn new(input_tx: mpsc::Sender<EngineInput>, timeout: Duration) -> Self {
        Self {
            input_tx,
            running: Arc::new(AtomicBool::new(false)),
            timeout,
        }
    }

    /// Start listening on a dedicated thread.
    ///
    /// The thread runs until `stop()` is called, the transcriber closes, or
    /// the engine queue is gone.
    pub fn start<T>(&mut self, transcriber: T) -> Result<(), ListenerError>
    where
        T: Transcriber + 'static,
    {
        if self.is_running() {
            return Err(ListenerError::AlreadyRunning);
        }

        let running = Arc::new(AtomicBool::new(true));
        let input_tx = self.input_tx.clone();
        let timeout = self.timeout;
        let thread_running = Arc::clone(&running);

        thread::Builder::new()
            .name("voice-listener".to_string())
            .spawn(move || {
                info!("voice listener thread started");
                listen_loop(transcriber, &input_tx, &thread_running, timeout);
                thread_running.store(false, Ordering::SeqCst);
                info!("voice listener thread stopped");
            })
            .map_err(|e| ListenerError::ThreadSpawn(e.to_string()))?;

        self.running = running;
        Ok(())
    }

    /// Ask the listener to stop after the current transcription attempt
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the listener is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

fn listen_loop<T: Transcriber>(
    mut transcriber: T,
    input_tx: &mpsc::Sender<EngineInput>,
    running: &AtomicBool,
    timeout: Duration,
) {
    let send = |input: EngineInput| input_tx.blocking_send(input).is_ok();
    let mut prompted = false;

    while running.load(Ordering::SeqCst) {
        if !prompted {
            if !send(EngineInput::ListenerStatus(messages::LISTENING.to_string())) {
                break;
            }
            prompted = true;
        }

        let outcome = transcriber.transcribe(timeout);
        // Stopped while waiting: the outcome is dropped, not forwarded
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let input = match outcome {
            Ok(text) => {
                debug!(%text, "utterance recognised");
                EngineInput::Utterance(text)
            }
            Err(TranscribeError::Timeout) => continue,
            Err(TranscribeError::Unintelligible) => {
                EngineInput::ListenerStatus(messages::UNINTELLIGIBLE.to_string())
            }
            Err(TranscribeError::Network(reason)) => {
                warn!(%reason, "speech recognition unavailable");
                EngineInput::ListenerStatus(messages::NO_NETWORK.to_string())
            }
            Err(TranscribeError::Closed) => {
                info!("voice input closed");
                let _ = send(EngineInput::ListenerStatus(
                    messages::VOICE_UNAVAILABLE.to_string(),
                ));
                break;
            }
        };

        if !send(input) {
            warn!("engine queue closed, listener exiting");
            break;
        }
        prompted = false;
    }
}
