//! Engine event loop
//!
//! Owns the [`Dispatcher`] and turns its [`Effect`]s into broadcast events,
//! queued speech and timer tasks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use super::input::EngineInput;
use crate::commands::classify;
use crate::dispatch::{messages, Dispatcher, Effect};
use crate::emergency::EmergencyContact;
use crate::events::EngineEvent;

pub struct Engine {
    dispatcher: Dispatcher,
    /// Handle back into our own queue, for timer and contact tasks.
    /// Weak so the loop still ends once every outside sender is gone.
    input_tx: mpsc::WeakSender<EngineInput>,
    event_tx: broadcast::Sender<EngineEvent>,
    speech_tx: mpsc::Sender<String>,
    contact: Arc<dyn EmergencyContact>,
    tick_interval: Duration,
    ticker: Option<JoinHandle<()>>,
}

impl Engine {
    pub fn new(
        dispatcher: Dispatcher,
        input_tx: &mpsc::Sender<EngineInput>,
        event_tx: broadcast::Sender<EngineEvent>,
        speech_tx: mpsc::Sender<String>,
        contact: Arc<dyn EmergencyContact>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            dispatcher,
            input_tx: input_tx.downgrade(),
            event_tx,
            speech_tx,
            contact,
            tick_interval,
            ticker: None,
        }
    }

    /// Run the engine until every input sender is dropped
    pub async fn run(&mut self, mut input_rx: mpsc::Receiver<EngineInput>) {
        info!("engine started");

        while let Some(input) = input_rx.recv().await {
            self.handle(input).await;
        }

        self.stop_ticker();
        info!("engine stopped");
    }

    /// Speak the startup greeting
    pub async fn greet(&mut self) {
        self.apply(Effect::Speak(messages::WELCOME.to_string())).await;
    }

    /// Handle a single input
    pub async fn handle(&mut self, input: EngineInput) {
        let effects = match input {
            EngineInput::Utterance(text) => {
                self.publish(EngineEvent::Display {
                    text: messages::heard(&text),
                });
                let intent = classify(&text);
                info!(utterance = %text, %intent, "voice command");
                self.publish(EngineEvent::Classified {
                    utterance: text,
                    intent,
                });
                self.dispatcher.dispatch(intent)
            }
            EngineInput::Manual(command) => {
                info!(?command, "manual command");
                self.dispatcher.dispatch(command.intent())
            }
            EngineInput::ListenerStatus(text) => vec![Effect::Display(text)],
            EngineInput::EmergencyTick => self.dispatcher.emergency_tick(),
            EngineInput::EmergencyContactFinished { contacted } => {
                self.dispatcher.emergency_contact_finished(contacted)
            }
        };

        for effect in effects {
            self.apply(effect).await;
        }
    }

    async fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Speak(text) => {
                self.publish(EngineEvent::Spoke { text: text.clone() });
                if let Err(e) = self.speech_tx.send(text).await {
                    warn!(text = %e.0, "speech worker gone, text not spoken");
                }
            }
            Effect::Display(text) => self.publish(EngineEvent::Display { text }),
            Effect::DeviceChanged { device, on } => {
                self.publish(EngineEvent::DeviceChanged { device, on })
            }
            Effect::NowPlaying(text) => self.publish(EngineEvent::NowPlaying { text }),
            Effect::EmergencyChanged(state) => self.publish(EngineEvent::EmergencyChanged { state }),
            Effect::StartCountdown => self.start_ticker(),
            Effect::ContactEmergency(identifier) => {
                self.stop_ticker();
                self.spawn_contact(identifier);
            }
        }
    }

    fn publish(&self, event: EngineEvent) {
        debug!(%event, "emitting event");
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    /// Post `EmergencyTick` every `tick_interval`, starting one interval from now
    fn start_ticker(&mut self) {
        self.stop_ticker();

        let input_tx = self.input_tx.clone();
        let period = self.tick_interval;

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                let Some(tx) = input_tx.upgrade() else { break };
                if tx.send(EngineInput::EmergencyTick).await.is_err() {
                    break;
                }
            }
        }));
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    /// Run the contact action off the engine task and report back through the queue
    fn spawn_contact(&self, identifier: String) {
        let contact = Arc::clone(&self.contact);
        let input_tx = self.input_tx.clone();

        tokio::spawn(async move {
            let contacted = match tokio::task::spawn_blocking(move || contact.contact(&identifier)).await {
                Ok(Ok(())) => true,
                Ok(Err(e)) => {
                    warn!(error = %e, "emergency contact failed");
                    false
                }
                Err(e) => {
                    error!(error = %e, "emergency contact task panicked");
                    false
                }
            };

            match input_tx.upgrade() {
                Some(tx) => {
                    if tx
                        .send(EngineInput::EmergencyContactFinished { contacted })
                        .await
                        .is_err()
                    {
                        warn!("engine gone before emergency contact finished");
                    }
                }
                None => warn!("engine gone before emergency contact finished"),
            }
        });
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
