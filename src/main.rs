//! pitwall-daemon: Background daemon for the Pit Wall race engineer assistant
//!
//! The daemon hosts the command responder behind a Unix socket:
//! - Intent table with first-match-wins dispatch over typed or spoken input
//! - Explicit Idle/Listening/Speaking lifecycle with at-most-one spoken reply
//! - IPC server for utterance submission, status queries, and event push
//!
//! Speech capture and synthesis are injectable capabilities; this binary
//! ships the degraded implementations (no microphone, silent voice), so
//! every command works over the text path.

mod config;
mod events;
mod intents;
mod ipc;
mod lifecycle;
mod speech;
mod state;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::events::EngineerEvent;
use crate::intents::ThreadRandom;
use crate::ipc::Server;
use crate::lifecycle::ShutdownSignal;
use crate::speech::{NoCapture, NullSynth, SpeechCapture, SpeechOutput};
use crate::state::Engineer;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "pitwall-daemon starting"
    );

    // Load configuration
    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(?config.socket_path, "configuration loaded");

    // Create shutdown signal handler
    let shutdown = ShutdownSignal::new();

    // Create channels for inter-component communication
    // IPC server / capabilities -> engineer
    let (input_tx, input_rx) = mpsc::channel(32);
    // Engineer -> IPC server (for broadcasting side-effect events)
    let (event_tx, _event_rx) = broadcast::channel::<EngineerEvent>(64);

    // Wire up the speech capabilities (degraded on a headless host)
    let capture = Box::new(NoCapture);
    let synth = Box::new(NullSynth::new(input_tx.clone(), config.voice));
    let capture_available = capture.available();
    let voice_available = synth.available();
    if !capture_available {
        warn!("no speech capture on this host, text input only");
    }

    // Create the engineer
    let mut engineer = Engineer::new(event_tx.clone(), capture, synth, Box::new(ThreadRandom));

    // Create IPC server
    let server = Server::new(
        &config.socket_path,
        input_tx.clone(),
        event_tx.clone(),
        capture_available,
        voice_available,
    )?;

    // Track engineer events for IPC status snapshots
    let mut status_event_rx = event_tx.subscribe();
    let server_for_events = &server;

    info!("daemon initialized, entering main loop");

    // Main event loop
    tokio::select! {
        // Run the engineer (processes toggle / utterance / capability events)
        _ = engineer.run(input_rx) => {
            info!("engineer exited");
        }

        // Run the IPC server (accepts client connections)
        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        // Mirror lifecycle events into the IPC status snapshot
        _ = async {
            loop {
                match status_event_rx.recv().await {
                    Ok(event) => {
                        debug!(%event, "engineer event");
                        let phase = match &event {
                            EngineerEvent::ListeningStarted => state::Phase::Listening,
                            EngineerEvent::ListeningStopped
                            | EngineerEvent::SpeechFinished => state::Phase::Idle,
                            EngineerEvent::Reply { .. } => state::Phase::Speaking,
                            EngineerEvent::CommandHeard { .. }
                            | EngineerEvent::Navigate { .. }
                            | EngineerEvent::Highlight { .. }
                            | EngineerEvent::ReplyDismissed => {
                                continue; // No phase change for these
                            }
                        };
                        server_for_events.set_phase(phase).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "engineer event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        } => {
            info!("event tracker exited");
        }

        // Wait for shutdown signal
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    // Cleanup
    info!("shutting down...");

    server.shutdown().await;

    info!("pitwall-daemon stopped");

    Ok(())
}
