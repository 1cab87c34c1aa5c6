//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use serde::{Deserialize, Serialize};

use crate::events::EngineerEvent;
use crate::state;

/// Lifecycle phase as reported over IPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for input
    #[default]
    Idle,
    /// Capture session running
    Listening,
    /// Reply being rendered
    Speaking,
}

/// Convert the engineer's internal phase to the IPC representation
impl From<state::Phase> for Phase {
    fn from(phase: state::Phase) -> Self {
        match phase {
            state::Phase::Idle => Phase::Idle,
            state::Phase::Listening => Phase::Listening,
            state::Phase::Speaking => Phase::Speaking,
        }
    }
}

/// Requests from UI to daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Request current daemon status
    GetStatus,

    /// Submit a typed utterance to the engineer
    Say { text: String },

    /// Toggle the listening control
    ToggleListening,

    /// Ping to check connectivity
    Ping,

    /// Subscribe to engineer event notifications
    Subscribe,
}

/// Responses from daemon to UI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Current daemon status
    Status(EngineerStatus),

    /// Request was forwarded to the engineer
    Accepted,

    /// Pong response to ping
    Pong,

    /// Subscription confirmed
    Subscribed,

    /// Error response
    Error { code: String, message: String },
}

/// Push notification from daemon to subscribed clients
///
/// The payload lives under its own key: `EngineerEvent` is itself
/// internally tagged with `"type"`, so inlining it next to the
/// notification tag would emit a duplicate key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// An engineer event occurred
    Event { event: EngineerEvent },
}

/// Full daemon status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineerStatus {
    /// Daemon version
    pub version: String,

    /// Current lifecycle phase
    pub phase: Phase,

    /// Whether speech capture exists on this host
    pub capture_available: bool,

    /// Whether audible speech output exists on this host
    pub voice_available: bool,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

impl Default for EngineerStatus {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            phase: Phase::default(),
            capture_available: false,
            voice_available: false,
            uptime_secs: 0,
        }
    }
}
