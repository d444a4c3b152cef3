//! Ordered delivery of spoken feedback

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::speaker::Speaker;

/// Spawn a task that speaks every received text in order.
///
/// The speaker runs on the blocking pool. A failed utterance is logged and
/// printed instead; it never stops the worker.
pub fn spawn_speech_worker(
    speaker: Arc<dyn Speaker>,
    mut speech_rx: mpsc::Receiver<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(text) = speech_rx.recv().await {
            let speaker = Arc::clone(&speaker);
            let spoken = text.clone();

            match tokio::task::spawn_blocking(move || speaker.speak(&spoken)).await {
                Ok(Ok(())) => debug!(%text, "spoke"),
                Ok(Err(e)) => {
                    warn!(error = %e, "speech failed, falling back to text");
                    println!("Speech: {}", text);
                }
                Err(e) => error!(error = %e, "speech task panicked"),
            }
        }

        debug!("speech worker stopped");
    })
}
