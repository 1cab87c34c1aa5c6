//! The engineer: command dispatch plus the Idle/Listening/Speaking flip-flop
//!
//! All state lives here and is mutated only from `handle_input`, driven
//! by one mpsc channel, so the single-task event-loop model is the whole
//! safety argument. Side effects leave as broadcast `EngineerEvent`s.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::events::{EngineerEvent, InputEvent};
use crate::intents::{self, RandomSource};
use crate::speech::{CaptureError, SpeechCapture, SpeechOutput};

/// How long a finished reply stays visible before auto-dismissal
pub const REPLY_HIDE_DELAY: Duration = Duration::from_millis(3000);

/// The three lifecycle phases of the engineer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for input
    #[default]
    Idle,
    /// A capture session is running
    Listening,
    /// A reply is being rendered
    Speaking,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Listening => write!(f, "Listening"),
            Phase::Speaking => write!(f, "Speaking"),
        }
    }
}

/// The race engineer: owns the responder state and the capability handles
pub struct Engineer {
    /// Current lifecycle phase
    phase: Phase,
    /// Channel for emitting side-effect events
    event_tx: broadcast::Sender<EngineerEvent>,
    capture: Box<dyn SpeechCapture>,
    synth: Box<dyn SpeechOutput>,
    rng: Box<dyn RandomSource>,
    /// Monotonic id handed to the synth per utterance
    utterance_seq: u64,
    /// Id of the utterance currently being rendered, if any
    current_utterance: Option<u64>,
    /// Deadline for auto-dismissing the visible reply, if scheduled
    hide_at: Option<Instant>,
}

impl Engineer {
    /// Create an engineer in the Idle phase
    pub fn new(
        event_tx: broadcast::Sender<EngineerEvent>,
        capture: Box<dyn SpeechCapture>,
        synth: Box<dyn SpeechOutput>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            phase: Phase::Idle,
            event_tx,
            capture,
            synth,
            rng,
            utterance_seq: 0,
            current_utterance: None,
            hide_at: None,
        }
    }

    /// Get the current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run the engineer, processing input events until the channel closes
    pub async fn run(&mut self, mut input_rx: mpsc::Receiver<InputEvent>) {
        info!("engineer started in Idle phase");

        loop {
            tokio::select! {
                event = input_rx.recv() => match event {
                    Some(event) => self.handle_input(event),
                    None => break,
                },
                () = sleep_until_opt(self.hide_at), if self.hide_at.is_some() => {
                    self.dismiss_reply();
                }
            }
        }

        info!("engineer stopped");
    }

    /// Handle one input event; every transition goes through here
    fn handle_input(&mut self, event: InputEvent) {
        debug!(?event, phase = %self.phase, "input event");
        match event {
            InputEvent::Toggle => self.handle_toggle(),
            InputEvent::Utterance(raw) => {
                self.hide_at = None;
                self.dispatch(&intents::normalize(&raw));
            }
            InputEvent::TranscriptReady(raw) => self.handle_transcript(&raw),
            InputEvent::CaptureError(kind) => self.handle_capture_error(kind),
            InputEvent::CaptureEnded => self.handle_capture_ended(),
            InputEvent::SpeechFinished { id } => self.handle_speech_finished(id),
        }
    }

    /// The pit wall button: start capture when idle, stop it when listening
    fn handle_toggle(&mut self) {
        if self.phase == Phase::Listening {
            self.stop_listening();
            return;
        }

        if !self.capture.available() {
            let reply = intents::capture_unavailable_reply(self.rng.as_mut());
            self.speak(reply.text);
            return;
        }

        // Starting to listen silences any reply in flight.
        if self.phase == Phase::Speaking {
            self.synth.cancel();
            self.current_utterance = None;
        }
        self.hide_at = None;

        match self.capture.start() {
            Ok(()) => {
                self.transition_to(Phase::Listening);
                let _ = self.event_tx.send(EngineerEvent::ListeningStarted);
            }
            Err(e) => {
                warn!(error = %e, "capture failed to start");
                self.transition_to(Phase::Idle);
            }
        }
    }

    /// Stop the capture session and return to Idle with no reply
    fn stop_listening(&mut self) {
        self.capture.stop();
        self.transition_to(Phase::Idle);
        let _ = self.event_tx.send(EngineerEvent::ListeningStopped);
    }

    /// Capture produced a transcript: leave Listening, then dispatch
    fn handle_transcript(&mut self, raw: &str) {
        if self.phase == Phase::Listening {
            self.transition_to(Phase::Idle);
            let _ = self.event_tx.send(EngineerEvent::ListeningStopped);
        }
        self.hide_at = None;
        self.dispatch(&intents::normalize(raw));
    }

    /// Capture failed: back to Idle plus an apology selected by error kind
    fn handle_capture_error(&mut self, kind: CaptureError) {
        warn!(error = %kind, "capture error");
        if self.phase == Phase::Listening {
            self.capture.stop();
            self.transition_to(Phase::Idle);
            let _ = self.event_tx.send(EngineerEvent::ListeningStopped);
        }

        let text = match kind {
            CaptureError::PermissionDenied => intents::PERMISSION_DENIED_REPLY,
            _ => intents::DIDNT_CATCH_REPLY,
        };
        self.speak(text.to_string());
    }

    /// Capture session ended without a transcript
    fn handle_capture_ended(&mut self) {
        if self.phase == Phase::Listening {
            self.stop_listening();
        }
    }

    /// Synth finished an utterance; stale ids from cancelled utterances are dropped
    fn handle_speech_finished(&mut self, id: u64) {
        if self.current_utterance != Some(id) {
            debug!(id, "stale speech completion ignored");
            return;
        }

        self.current_utterance = None;
        if self.phase == Phase::Speaking {
            self.transition_to(Phase::Idle);
        }
        let _ = self.event_tx.send(EngineerEvent::SpeechFinished);
        self.hide_at = Some(Instant::now() + REPLY_HIDE_DELAY);
    }

    /// Match the utterance, emit side effects, and speak the reply
    fn dispatch(&mut self, utterance: &str) {
        let _ = self.event_tx.send(EngineerEvent::CommandHeard {
            text: utterance.to_string(),
        });

        let reply = match intents::match_intent(utterance) {
            Some(intent) => {
                info!(?intent, "intent matched");
                intents::respond(intent, self.rng.as_mut())
            }
            None => {
                info!("no intent matched, using fallback");
                intents::fallback_reply()
            }
        };

        if let Some(section) = reply.navigate {
            let _ = self.event_tx.send(EngineerEvent::Navigate {
                section: section.to_string(),
            });
        }
        if let Some(highlight) = reply.highlight {
            let _ = self.event_tx.send(EngineerEvent::Highlight {
                target: highlight.target.to_string(),
                stagger_ms: highlight.stagger_ms,
                hold_ms: highlight.hold_ms,
            });
        }

        self.speak(reply.text);
    }

    /// Start rendering a reply, cancelling any utterance already in flight
    fn speak(&mut self, text: String) {
        if self.phase == Phase::Speaking {
            self.synth.cancel();
        }
        self.hide_at = None;

        self.utterance_seq += 1;
        let id = self.utterance_seq;
        self.current_utterance = Some(id);
        self.synth.speak(id, &text);

        let _ = self.event_tx.send(EngineerEvent::Reply { text });
        self.transition_to(Phase::Speaking);
    }

    /// Auto-dismiss the visible reply once the hide deadline passes
    fn dismiss_reply(&mut self) {
        self.hide_at = None;
        if self.phase == Phase::Idle {
            let _ = self.event_tx.send(EngineerEvent::ReplyDismissed);
        }
    }

    /// Perform a phase transition
    fn transition_to(&mut self, new_phase: Phase) {
        if new_phase == self.phase {
            return;
        }
        info!(from = %self.phase, to = %new_phase, "phase transition");
        self.phase = new_phase;
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::intents::testing::SeqRandom;

    /// Shared record of capability calls, inspected by tests
    #[derive(Clone, Default)]
    struct CallLog(Arc<Mutex<Vec<String>>>);

    impl CallLog {
        fn push(&self, call: impl Into<String>) {
            self.0.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    struct FakeCapture {
        available: bool,
        log: CallLog,
    }

    impl SpeechCapture for FakeCapture {
        fn available(&self) -> bool {
            self.available
        }

        fn start(&mut self) -> Result<(), CaptureError> {
            self.log.push("capture.start");
            Ok(())
        }

        fn stop(&mut self) {
            self.log.push("capture.stop");
        }
    }

    struct FakeSynth {
        log: CallLog,
    }

    impl SpeechOutput for FakeSynth {
        fn available(&self) -> bool {
            true
        }

        fn speak(&mut self, id: u64, text: &str) {
            let head: String = text.chars().take(20).collect();
            self.log.push(format!("speak {id}: {head}"));
        }

        fn cancel(&mut self) {
            self.log.push("cancel");
        }
    }

    fn create_engineer(
        capture_available: bool,
    ) -> (Engineer, broadcast::Receiver<EngineerEvent>, CallLog) {
        let (tx, rx) = broadcast::channel(64);
        let log = CallLog::default();
        let engineer = Engineer::new(
            tx,
            Box::new(FakeCapture {
                available: capture_available,
                log: log.clone(),
            }),
            Box::new(FakeSynth { log: log.clone() }),
            Box::new(SeqRandom::new(&[0.0])),
        );
        (engineer, rx, log)
    }

    fn drain(rx: &mut broadcast::Receiver<EngineerEvent>) -> Vec<EngineerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_initial_phase() {
        let (engineer, _, _) = create_engineer(true);
        assert_eq!(engineer.phase(), Phase::Idle);
    }

    #[test]
    fn test_toggle_on_then_off_produces_no_reply() {
        let (mut engineer, mut rx, log) = create_engineer(true);

        engineer.handle_input(InputEvent::Toggle);
        assert_eq!(engineer.phase(), Phase::Listening);

        engineer.handle_input(InputEvent::Toggle);
        assert_eq!(engineer.phase(), Phase::Idle);

        let events = drain(&mut rx);
        assert!(matches!(events[0], EngineerEvent::ListeningStarted));
        assert!(matches!(events[1], EngineerEvent::ListeningStopped));
        assert_eq!(events.len(), 2);
        assert_eq!(log.calls(), vec!["capture.start", "capture.stop"]);
    }

    #[test]
    fn test_transcript_dispatches_and_navigates() {
        let (mut engineer, mut rx, _) = create_engineer(true);

        engineer.handle_input(InputEvent::Toggle);
        engineer.handle_input(InputEvent::TranscriptReady("Show Teams".into()));
        assert_eq!(engineer.phase(), Phase::Speaking);

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            EngineerEvent::CommandHeard { text } if text == "show teams"
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            EngineerEvent::Navigate { section } if section == "teams"
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            EngineerEvent::Reply { text } if text.contains("grid")
        )));
    }

    #[test]
    fn test_typed_greeting_no_navigation() {
        let (mut engineer, mut rx, _) = create_engineer(true);

        engineer.handle_input(InputEvent::Utterance("Hello Engineer".into()));
        assert_eq!(engineer.phase(), Phase::Speaking);

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            EngineerEvent::Reply { text } if text.contains("AI Race Engineer")
        )));
        assert!(!events
            .iter()
            .any(|e| matches!(e, EngineerEvent::Navigate { .. })));
    }

    #[test]
    fn test_unmatched_utterance_falls_back_without_side_effects() {
        let (mut engineer, mut rx, _) = create_engineer(true);

        engineer.handle_input(InputEvent::Utterance("gibberish xyz".into()));

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            EngineerEvent::Reply { text } if text.contains("telemetry link")
        )));
        assert!(!events
            .iter()
            .any(|e| matches!(e, EngineerEvent::Navigate { .. })));
        assert!(!events
            .iter()
            .any(|e| matches!(e, EngineerEvent::Highlight { .. })));
    }

    #[test]
    fn test_scan_emits_highlight_request() {
        let (mut engineer, mut rx, _) = create_engineer(true);

        engineer.handle_input(InputEvent::Utterance("system scan".into()));

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            EngineerEvent::Highlight { target, stagger_ms: 400, hold_ms: 3000 }
                if target == "car-card"
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            EngineerEvent::Navigate { section } if section == "cars"
        )));
    }

    #[test]
    fn test_second_speak_cancels_first() {
        let (mut engineer, _rx, log) = create_engineer(true);

        engineer.handle_input(InputEvent::Utterance("box box".into()));
        engineer.handle_input(InputEvent::Utterance("hammer time".into()));

        let calls = log.calls();
        assert_eq!(calls[0], "speak 1: Confirming box. Box ");
        assert_eq!(calls[1], "cancel");
        assert!(calls[2].starts_with("speak 2:"));
    }

    #[test]
    fn test_stale_speech_completion_is_ignored() {
        let (mut engineer, _rx, _) = create_engineer(true);

        engineer.handle_input(InputEvent::Utterance("box box".into()));
        engineer.handle_input(InputEvent::Utterance("hammer time".into()));

        // Completion for the cancelled first utterance must not end the second.
        engineer.handle_input(InputEvent::SpeechFinished { id: 1 });
        assert_eq!(engineer.phase(), Phase::Speaking);

        engineer.handle_input(InputEvent::SpeechFinished { id: 2 });
        assert_eq!(engineer.phase(), Phase::Idle);
    }

    #[test]
    fn test_speech_finished_schedules_dismissal() {
        let (mut engineer, _rx, _) = create_engineer(true);

        engineer.handle_input(InputEvent::Utterance("box box".into()));
        engineer.handle_input(InputEvent::SpeechFinished { id: 1 });
        assert!(engineer.hide_at.is_some());

        // A new interaction cancels the pending dismissal.
        engineer.handle_input(InputEvent::Utterance("hammer time".into()));
        assert!(engineer.hide_at.is_none());
    }

    #[test]
    fn test_capture_unavailable_speaks_canned_quote() {
        let (mut engineer, mut rx, log) = create_engineer(false);

        engineer.handle_input(InputEvent::Toggle);
        assert_eq!(engineer.phase(), Phase::Speaking);

        let events = drain(&mut rx);
        assert!(!events
            .iter()
            .any(|e| matches!(e, EngineerEvent::ListeningStarted)));
        assert!(events.iter().any(|e| matches!(
            e,
            EngineerEvent::Reply { text } if text.contains("Copy that, we're monitoring")
        )));
        // Capture was never started.
        assert!(!log.calls().iter().any(|c| c == "capture.start"));
    }

    #[test]
    fn test_permission_denied_apology() {
        let (mut engineer, mut rx, _) = create_engineer(true);

        engineer.handle_input(InputEvent::Toggle);
        engineer.handle_input(InputEvent::CaptureError(CaptureError::PermissionDenied));
        assert_eq!(engineer.phase(), Phase::Speaking);

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            EngineerEvent::Reply { text } if text.contains("microphone access was denied")
        )));
    }

    #[test]
    fn test_generic_capture_error_apology() {
        let (mut engineer, mut rx, _) = create_engineer(true);

        engineer.handle_input(InputEvent::Toggle);
        engineer.handle_input(InputEvent::CaptureError(CaptureError::NoSpeech));

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            EngineerEvent::Reply { text } if text.contains("didn't quite catch that")
        )));
    }

    #[test]
    fn test_capture_ended_while_listening_returns_to_idle() {
        let (mut engineer, mut rx, _) = create_engineer(true);

        engineer.handle_input(InputEvent::Toggle);
        engineer.handle_input(InputEvent::CaptureEnded);
        assert_eq!(engineer.phase(), Phase::Idle);

        let events = drain(&mut rx);
        assert!(!events.iter().any(|e| matches!(e, EngineerEvent::Reply { .. })));
    }

    #[test]
    fn test_toggle_while_speaking_cancels_speech() {
        let (mut engineer, _rx, log) = create_engineer(true);

        engineer.handle_input(InputEvent::Utterance("box box".into()));
        engineer.handle_input(InputEvent::Toggle);
        assert_eq!(engineer.phase(), Phase::Listening);

        let calls = log.calls();
        assert!(calls.contains(&"cancel".to_string()));
        assert!(calls.contains(&"capture.start".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_auto_dismisses_after_delay() {
        let (tx, mut rx) = broadcast::channel(64);
        let log = CallLog::default();
        let mut engineer = Engineer::new(
            tx,
            Box::new(FakeCapture {
                available: true,
                log: log.clone(),
            }),
            Box::new(FakeSynth { log }),
            Box::new(SeqRandom::new(&[0.0])),
        );

        let (input_tx, input_rx) = mpsc::channel(16);
        tokio::spawn(async move { engineer.run(input_rx).await });

        input_tx
            .send(InputEvent::Utterance("box box".into()))
            .await
            .unwrap();
        input_tx
            .send(InputEvent::SpeechFinished { id: 1 })
            .await
            .unwrap();

        loop {
            match rx.recv().await.unwrap() {
                EngineerEvent::SpeechFinished => break,
                _ => continue,
            }
        }

        // Paused time advances across the 3 s hide delay.
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, EngineerEvent::ReplyDismissed));
    }
}
