//! Degraded capture implementation for hosts without a microphone stack

use tracing::debug;

use super::{CaptureError, SpeechCapture};

/// Capture implementation for hosts with no speech recognition
///
/// Always reports unavailable; the engineer answers the listening toggle
/// with a canned status line instead of entering `Listening`.
pub struct NoCapture;

impl SpeechCapture for NoCapture {
    fn available(&self) -> bool {
        false
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        Err(CaptureError::Unavailable)
    }

    fn stop(&mut self) {
        debug!("stop requested on unavailable capture");
    }
}
