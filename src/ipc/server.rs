//! Unix domain socket server for IPC
//!
//! Forwards `say` / `toggle_listening` requests into the engineer's
//! input channel and pushes engineer events to subscribed clients.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, error, info, warn};

use crate::events::{EngineerEvent, InputEvent};
use crate::state;

use super::protocol::{EngineerStatus, Notification, Request, Response};

/// Frames above this size disconnect the client
const MAX_FRAME_BYTES: usize = 1024 * 1024;

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    state: Arc<RwLock<ServerState>>,
    shutdown_tx: broadcast::Sender<()>,
    /// Channel into the engineer's event loop
    input_tx: mpsc::Sender<InputEvent>,
    /// Event stream handed to subscribing clients
    event_tx: broadcast::Sender<EngineerEvent>,
}

/// Shared server state
struct ServerState {
    status: EngineerStatus,
    start_time: std::time::Instant,
}

impl Server {
    /// Create a new IPC server
    pub fn new(
        socket_path: &Path,
        input_tx: mpsc::Sender<InputEvent>,
        event_tx: broadcast::Sender<EngineerEvent>,
        capture_available: bool,
        voice_available: bool,
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

        let status = EngineerStatus {
            capture_available,
            voice_available,
            ..EngineerStatus::default()
        };
        let state = Arc::new(RwLock::new(ServerState {
            status,
            start_time: std::time::Instant::now(),
        }));

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            state,
            shutdown_tx,
            input_tx,
            event_tx,
        })
    }

    /// Update the engineer phase reported in status snapshots
    pub async fn set_phase(&self, phase: state::Phase) {
        let mut server_state = self.state.write().await;
        let old_phase = server_state.status.phase;
        server_state.status.phase = phase.into();

        if old_phase != server_state.status.phase {
            debug!(from = ?old_phase, to = %phase, "IPC server: phase updated");
        }
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref().context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let state = Arc::clone(&self.state);
                    let input_tx = self.input_tx.clone();
                    let event_tx = self.event_tx.clone();
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, state, input_tx, event_tx) => {
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
    ///
    /// All frames leave through one writer task so request responses and
    /// pushed notifications never interleave mid-frame.
    async fn handle_client(
        stream: UnixStream,
        state: Arc<RwLock<ServerState>>,
        input_tx: mpsc::Sender<InputEvent>,
        event_tx: broadcast::Sender<EngineerEvent>,
    ) -> Result<()> {
        let (mut reader, writer) = stream.into_split();
        let (out_tx, out_rx) = mpsc::channel::<Vec<u8>>(32);
        let writer_task = tokio::spawn(Self::write_frames(writer, out_rx));

        let mut forwarder: Option<tokio::task::JoinHandle<()>> = None;
        let mut len_buf = [0u8; 4];

        let result: Result<()> = loop {
            // Read message length (4-byte little-endian)
            match reader.read_exact(&mut len_buf).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    debug!("client disconnected");
                    break Ok(());
                }
                Err(e) => break Err(e.into()),
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            if len > MAX_FRAME_BYTES {
                warn!(len, "message too large, disconnecting");
                break Ok(());
            }

            // Read message body
            let mut msg_buf = vec![0u8; len];
            if let Err(e) = reader.read_exact(&mut msg_buf).await {
                break Err(e.into());
            }

            let response = match serde_json::from_slice::<Request>(&msg_buf) {
                Ok(Request::Subscribe) => {
                    if forwarder.is_none() {
                        forwarder = Some(tokio::spawn(Self::forward_events(
                            event_tx.subscribe(),
                            out_tx.clone(),
                        )));
                        debug!("client subscribed to notifications");
                    }
                    Response::Subscribed
                }
                Ok(request) => {
                    debug!(?request, "received request");
                    Self::process_request(request, &state, &input_tx).await
                }
                Err(e) => Response::Error {
                    code: "bad_request".to_string(),
                    message: e.to_string(),
                },
            };

            let frame = match serde_json::to_vec(&response) {
                Ok(frame) => frame,
                Err(e) => break Err(e.into()),
            };
            if out_tx.send(frame).await.is_err() {
                break Ok(());
            }
        };

        if let Some(task) = forwarder {
            task.abort();
        }
        drop(out_tx);
        let _ = writer_task.await;
        result
    }

    /// Writer task: drain pre-serialized frames onto the socket
    async fn write_frames(mut writer: OwnedWriteHalf, mut out_rx: mpsc::Receiver<Vec<u8>>) {
        while let Some(frame) = out_rx.recv().await {
            let len = (frame.len() as u32).to_le_bytes();
            if writer.write_all(&len).await.is_err() {
                break;
            }
            if writer.write_all(&frame).await.is_err() {
                break;
            }
        }
    }

    /// Forward engineer events to one subscribed client
    async fn forward_events(
        mut event_rx: broadcast::Receiver<EngineerEvent>,
        out_tx: mpsc::Sender<Vec<u8>>,
    ) {
        loop {
            match event_rx.recv().await {
                Ok(event) => {
                    let frame = match serde_json::to_vec(&Notification::Event { event }) {
                        Ok(frame) => frame,
                        Err(e) => {
                            warn!(?e, "failed to encode notification");
                            continue;
                        }
                    };
                    if out_tx.send(frame).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "notification receiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// Process a request and return a response
    async fn process_request(
        request: Request,
        state: &Arc<RwLock<ServerState>>,
        input_tx: &mpsc::Sender<InputEvent>,
    ) -> Response {
        match request {
            Request::Ping => Response::Pong,

            Request::GetStatus => {
                let mut state = state.write().await;
                state.status.uptime_secs = state.start_time.elapsed().as_secs();
                Response::Status(state.status.clone())
            }

            Request::Say { text } => {
                if text.trim().is_empty() {
                    return Response::Error {
                        code: "empty_utterance".to_string(),
                        message: "utterance must be non-empty".to_string(),
                    };
                }
                match input_tx.send(InputEvent::Utterance(text)).await {
                    Ok(()) => Response::Accepted,
                    Err(_) => Response::Error {
                        code: "engineer_down".to_string(),
                        message: "engineer is not running".to_string(),
                    },
                }
            }

            Request::ToggleListening => match input_tx.send(InputEvent::Toggle).await {
                Ok(()) => Response::Accepted,
                Err(_) => Response::Error {
                    code: "engineer_down".to_string(),
                    message: "engineer is not running".to_string(),
                },
            },

            // Handled in the client loop; kept total for exhaustiveness.
            Request::Subscribe => Response::Subscribed,
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
