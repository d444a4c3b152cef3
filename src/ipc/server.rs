//! Unix domain socket server for IPC
//!
//! Provides request-response communication, forwards manual controls to the
//! engine queue, and pushes engine events to subscribed clients.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::protocol::{read_message, send_message, DaemonStatus, Request, Response};
use crate::engine::{EngineInput, ManualCommand};
use crate::events::EngineEvent;

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: UnixListener,
    state: Arc<RwLock<ServerState>>,
    shutdown_tx: broadcast::Sender<()>,
    input_tx: mpsc::Sender<EngineInput>,
    event_tx: broadcast::Sender<EngineEvent>,
}

/// Shared server state
struct ServerState {
    status: DaemonStatus,
    start_time: std::time::Instant,
}

/// Everything a client handler needs
#[derive(Clone)]
struct ClientContext {
    state: Arc<RwLock<ServerState>>,
    input_tx: mpsc::Sender<EngineInput>,
    event_tx: broadcast::Sender<EngineEvent>,
}

impl Server {
    /// Create a new IPC server bound to `socket_path`
    pub fn new(
        socket_path: &Path,
        input_tx: mpsc::Sender<EngineInput>,
        event_tx: broadcast::Sender<EngineEvent>,
    ) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Set socket permissions to owner-only (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        let state = Arc::new(RwLock::new(ServerState {
            status: DaemonStatus::default(),
            start_time: std::time::Instant::now(),
        }));

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener,
            state,
            shutdown_tx,
            input_tx,
            event_tx,
        })
    }

    /// Record whether voice input is active
    pub async fn set_listening(&self, listening: bool) {
        self.state.write().await.status.listening = listening;
    }

    /// Fold an engine event into the status snapshot
    pub async fn apply_event(&self, event: &EngineEvent) {
        let mut state = self.state.write().await;
        let before = state.status.emergency;
        state.status.apply(event);

        if before != state.status.emergency {
            info!(
                from = %before,
                to = %state.status.emergency,
                "IPC server: emergency state updated"
            );
        }
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let ctx = ClientContext {
                        state: Arc::clone(&self.state),
                        input_tx: self.input_tx.clone(),
                        event_tx: self.event_tx.clone(),
                    };
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, ctx) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    async fn handle_client(stream: UnixStream, ctx: ClientContext) -> Result<()> {
        let (mut reader, writer) = stream.into_split();
        let writer = Arc::new(Mutex::new(writer));
        let mut forwarder: Option<JoinHandle<()>> = None;

        let result = Self::serve_requests(&mut reader, &writer, &ctx, &mut forwarder).await;

        if let Some(forwarder) = forwarder {
            forwarder.abort();
        }
        result
    }

    /// Answer requests until the client disconnects
    async fn serve_requests(
        reader: &mut OwnedReadHalf,
        writer: &Arc<Mutex<OwnedWriteHalf>>,
        ctx: &ClientContext,
        forwarder: &mut Option<JoinHandle<()>>,
    ) -> Result<()> {
        loop {
            let request: Request = match read_message(reader).await {
                Ok(Some(request)) => request,
                Ok(None) => {
                    debug!("client disconnected");
                    return Ok(());
                }
                Err(e) => {
                    let response = Response::error("bad_request", e.to_string());
                    send_message(&mut *writer.lock().await, &response).await?;
                    return Err(e);
                }
            };

            debug!(?request, "received request");

            let (response, subscribe) = Self::process_request(request, ctx).await;

            // Subscribe before confirming so no event after the reply is missed
            let event_rx = (subscribe && forwarder.is_none()).then(|| ctx.event_tx.subscribe());
            send_message(&mut *writer.lock().await, &response).await?;

            if let Some(event_rx) = event_rx {
                debug!("client subscribed to notifications");
                *forwarder = Some(Self::forward_events(event_rx, Arc::clone(writer)));
            }
        }
    }

    /// Push every engine event to a subscribed client
    fn forward_events(
        mut event_rx: broadcast::Receiver<EngineEvent>,
        writer: Arc<Mutex<OwnedWriteHalf>>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match event_rx.recv().await {
                    Ok(event) => {
                        let response = Response::Event { event };
                        if let Err(e) = send_message(&mut *writer.lock().await, &response).await {
                            debug!(?e, "subscriber went away");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Process a request and return a response
    /// Returns (Response, should_subscribe)
    async fn process_request(request: Request, ctx: &ClientContext) -> (Response, bool) {
        let command = match request {
            Request::Ping => return (Response::Pong, false),

            Request::GetStatus => {
                let state = ctx.state.read().await;
                let mut status = state.status.clone();
                status.uptime_secs = state.start_time.elapsed().as_secs();
                return (Response::Status(status), false);
            }

            Request::Subscribe => return (Response::Subscribed, true),

            Request::ToggleLight => ManualCommand::ToggleLight,
            Request::ToggleMusic => ManualCommand::ToggleMusic,
            Request::TriggerEmergency => ManualCommand::TriggerEmergency,
        };

        match ctx.input_tx.send(EngineInput::Manual(command)).await {
            Ok(()) => {
                info!(?command, "manual command via IPC");
                (Response::Accepted { command }, false)
            }
            Err(_) => (
                Response::error("engine_unavailable", "engine is not running"),
                false,
            ),
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        // Remove socket file
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}
