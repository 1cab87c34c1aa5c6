//! Speech capability seams
//!
//! The engineer depends on two external, possibly-unavailable
//! capabilities: microphone capture with transcription, and audio
//! synthesis. Both are modeled as traits so the daemon runs (text-only)
//! without either, and so the state machine is unit-testable with
//! scripted implementations.

mod capture;
mod synth;

pub use capture::NoCapture;
pub use synth::NullSynth;

use thiserror::Error;

/// Failure modes reported by a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The host has no capture capability at all
    #[error("speech capture is not available")]
    Unavailable,

    /// Microphone access was denied by the user or platform
    #[error("microphone access denied")]
    PermissionDenied,

    /// No speech was detected before the session timed out
    #[error("no speech detected")]
    NoSpeech,

    /// Any other capture failure (device loss, transport error, ...)
    #[error("speech capture failed")]
    Other,
}

/// Microphone capture + transcription capability
///
/// Implementations deliver results asynchronously as `InputEvent`s
/// (`TranscriptReady`, `CaptureError`, `CaptureEnded`) on the engineer's
/// input channel they were constructed with.
pub trait SpeechCapture: Send {
    /// Whether the capability exists on this host
    fn available(&self) -> bool;

    /// Begin a capture session
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Stop the current capture session, if any
    fn stop(&mut self);
}

/// Audio synthesis capability
///
/// `speak` is handed an id chosen by the engineer; the implementation
/// reports completion as `InputEvent::SpeechFinished { id }` so a finish
/// belonging to a cancelled utterance can be told apart from the current
/// one.
pub trait SpeechOutput: Send {
    /// Whether audible output exists on this host
    fn available(&self) -> bool;

    /// Start rendering `text`, replacing nothing (the engineer cancels first)
    fn speak(&mut self, id: u64, text: &str);

    /// Cancel the in-flight utterance, if any
    fn cancel(&mut self);
}
