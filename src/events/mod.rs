//! Event types flowing into and out of the engineer
//!
//! `InputEvent` carries everything the engineer reacts to (IPC requests,
//! capture callbacks, synthesis completion). `EngineerEvent` is the
//! broadcast side-effect stream consumed by the IPC server and any
//! subscribed UI clients.

use serde::{Deserialize, Serialize};

use crate::speech::CaptureError;

/// Inputs delivered to the engineer's event loop
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// User toggled the listening control (pit wall button)
    Toggle,

    /// User submitted a typed utterance
    Utterance(String),

    /// Speech capture produced a transcript
    TranscriptReady(String),

    /// Speech capture failed
    CaptureError(CaptureError),

    /// Speech capture session ended without a transcript
    CaptureEnded,

    /// Speech output finished playing the identified utterance
    SpeechFinished {
        /// Id assigned by the engineer when the utterance was started
        id: u64,
    },
}

/// Events emitted by the engineer during command handling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineerEvent {
    /// Capture started, waiting for a command
    ListeningStarted,

    /// Capture stopped without producing a reply
    ListeningStopped,

    /// An utterance was received and is being dispatched
    CommandHeard {
        /// Normalized utterance text
        text: String,
    },

    /// A reply is being spoken / shown
    Reply {
        /// Full reply text
        text: String,
    },

    /// The UI should scroll to a page section
    Navigate {
        /// Section identifier, e.g. "teams"
        section: String,
    },

    /// The UI should run a staggered highlight over an element collection
    Highlight {
        /// Element collection name, e.g. "car-card"
        target: String,
        /// Delay between successive elements in milliseconds
        stagger_ms: u64,
        /// How long each element stays highlighted in milliseconds
        hold_ms: u64,
    },

    /// The current reply finished playing
    SpeechFinished,

    /// The visible reply indicator was auto-dismissed
    ReplyDismissed,
}

impl std::fmt::Display for EngineerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineerEvent::ListeningStarted => write!(f, "LISTENING_STARTED"),
            EngineerEvent::ListeningStopped => write!(f, "LISTENING_STOPPED"),
            EngineerEvent::CommandHeard { text } => write!(f, "COMMAND_HEARD ({text})"),
            EngineerEvent::Reply { text } => write!(f, "REPLY ({} chars)", text.len()),
            EngineerEvent::Navigate { section } => write!(f, "NAVIGATE ({section})"),
            EngineerEvent::Highlight { target, stagger_ms, hold_ms } => {
                write!(f, "HIGHLIGHT ({target}, {stagger_ms}ms stagger, {hold_ms}ms hold)")
            }
            EngineerEvent::SpeechFinished => write!(f, "SPEECH_FINISHED"),
            EngineerEvent::ReplyDismissed => write!(f, "REPLY_DISMISSED"),
        }
    }
}
