//! voicehome-daemon: background daemon for the voice-controlled home panel
//!
//! This daemon provides:
//! - A voice listener (one utterance per line of standard input)
//! - A single engine task owning all device and emergency state
//! - An IPC server for manual controls and status

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use voicehome::audio::{AudioBackend, SimulatedBackend};
use voicehome::dispatch::Dispatcher;
use voicehome::emergency::{EmergencySequencer, OpenerContact};
use voicehome::engine::{Engine, EngineInput};
use voicehome::events::EngineEvent;
use voicehome::ipc::Server;
use voicehome::lifecycle::ShutdownSignal;
use voicehome::listener::VoiceListener;
use voicehome::playlist::Playlist;
use voicehome::speech::{spawn_speech_worker, CommandSpeaker, ConsoleSpeaker, LineTranscriber, Speaker};
use voicehome::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "voicehome-daemon starting"
    );

    // Load configuration
    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(?config.socket_path, ?config.music_dir, "configuration loaded");

    // Create shutdown signal handler
    let shutdown = ShutdownSignal::new();

    // Listener / IPC / timers -> engine
    let (input_tx, input_rx) = mpsc::channel::<EngineInput>(32);
    // Engine -> IPC server and subscribers
    let (event_tx, _event_rx) = broadcast::channel::<EngineEvent>(64);
    // Engine -> speech worker
    let (speech_tx, speech_rx) = mpsc::channel::<String>(32);

    let speaker: Arc<dyn Speaker> = match &config.tts_command {
        Some(command) => Arc::new(
            CommandSpeaker::parse(command).context("invalid VOICEHOME_TTS_COMMAND")?,
        ),
        None => Arc::new(ConsoleSpeaker),
    };
    let speech_worker = spawn_speech_worker(speaker, speech_rx);

    // Create the engine
    let dispatcher = Dispatcher::new(
        Playlist::load(&config.music_dir),
        audio_backend(),
        EmergencySequencer::new(config.countdown_secs, config.emergency_contact.clone()),
    );
    let mut engine = Engine::new(
        dispatcher,
        &input_tx,
        event_tx.clone(),
        speech_tx,
        Arc::new(OpenerContact::new(config.contact_command.clone())),
        config.tick_interval,
    );

    // Start the voice listener (runs on dedicated thread)
    let mut listener = VoiceListener::new(input_tx.clone(), config.listen_timeout);
    let listening = match listener.start(LineTranscriber::stdin()) {
        Ok(()) => {
            info!("voice listener started");
            true
        }
        Err(e) => {
            error!(?e, "failed to start voice listener");
            warn!("continuing without voice input - use manual controls");
            false
        }
    };

    // Create IPC server
    let server = Server::new(&config.socket_path, input_tx.clone(), event_tx.clone())?;
    server.set_listening(listening).await;

    // Subscribe to engine events for the status snapshot
    let mut status_rx = event_tx.subscribe();
    let server_for_events = &server;

    engine.greet().await;

    info!("daemon initialized, entering main loop");

    // Main event loop
    tokio::select! {
        // Run the engine (processes voice, manual and timer input)
        _ = engine.run(input_rx) => {
            info!("engine exited");
        }

        // Run the IPC server (accepts client connections)
        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        // Keep the IPC status snapshot in sync
        _ = async {
            loop {
                match status_rx.recv().await {
                    Ok(event) => {
                        server_for_events.apply_event(&event).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "status event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        } => {
            info!("status event handler exited");
        }

        // Wait for shutdown signal
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    // Cleanup
    info!("shutting down...");

    listener.stop();
    server.shutdown().await;
    drop(engine);
    speech_worker.abort();

    info!("voicehome-daemon stopped");

    Ok(())
}

/// Speaker output when available, simulated playback otherwise
#[cfg(feature = "playback")]
fn audio_backend() -> Box<dyn AudioBackend> {
    match voicehome::audio::DeviceBackend::new() {
        Ok(backend) => Box::new(backend),
        Err(e) => {
            warn!(error = %e, "audio output unavailable, music will be simulated");
            Box::new(SimulatedBackend::new())
        }
    }
}

#[cfg(not(feature = "playback"))]
fn audio_backend() -> Box<dyn AudioBackend> {
    info!("built without the playback feature, music will be simulated");
    Box::new(SimulatedBackend::new())
}
