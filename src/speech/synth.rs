//! Degraded synthesis implementation for hosts without audio output

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::VoiceTuning;
use crate::events::InputEvent;

use super::SpeechOutput;

/// Silent synthesis backend
///
/// Renders nothing and reports each utterance finished immediately, so
/// the text-only reply path (bubble text + auto-dismiss) behaves the
/// same as it would with a real voice.
pub struct NullSynth {
    input_tx: mpsc::Sender<InputEvent>,
    tuning: VoiceTuning,
    current: Option<u64>,
}

impl NullSynth {
    /// Create a silent synth reporting completions on `input_tx`
    pub fn new(input_tx: mpsc::Sender<InputEvent>, tuning: VoiceTuning) -> Self {
        Self {
            input_tx,
            tuning,
            current: None,
        }
    }
}

impl SpeechOutput for NullSynth {
    fn available(&self) -> bool {
        false
    }

    fn speak(&mut self, id: u64, text: &str) {
        info!(
            id,
            pitch = self.tuning.pitch,
            rate = self.tuning.rate,
            chars = text.len(),
            "silent synth: utterance started"
        );
        self.current = Some(id);

        // No audio to play, so the utterance is over as soon as it starts.
        if self.input_tx.try_send(InputEvent::SpeechFinished { id }).is_err() {
            warn!(id, "input channel full, dropping speech completion");
        }
    }

    fn cancel(&mut self) {
        if let Some(id) = self.current.take() {
            debug!(id, "silent synth: utterance cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_synth_finishes_immediately() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut synth = NullSynth::new(tx, VoiceTuning::default());

        synth.speak(7, "box box");

        match rx.recv().await {
            Some(InputEvent::SpeechFinished { id }) => assert_eq!(id, 7),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
