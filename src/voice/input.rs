use log::{ debug, warn };
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use super::{ Capability, VoiceError };

/// What a platform recognizer reports back after `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Transcript(String),
    Error(String),
    End,
}

/// A recognizer event stamped with the listening session that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionUpdate {
    pub session: u64,
    pub event: RecognitionEvent,
}

/// Where one recognition session reports its events.
#[derive(Debug, Clone)]
pub struct RecognitionSink {
    session: u64,
    events: UnboundedSender<RecognitionUpdate>,
}

impl RecognitionSink {
    pub fn new(session: u64, events: UnboundedSender<RecognitionUpdate>) -> Self {
        Self { session, events }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    /// Returns false once nobody is listening any more.
    pub fn send(&self, event: RecognitionEvent) -> bool {
        self.events.send(RecognitionUpdate { session: self.session, event }).is_ok()
    }
}

/// Platform speech-to-text. `start` begins one single-utterance session and
/// returns immediately; results arrive later on `sink`.
pub trait SpeechRecognizer: Send + Sync {
    fn start(&self, sink: RecognitionSink) -> Result<(), VoiceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListenState {
    #[default]
    Idle,
    Listening,
}

pub struct VoiceInput {
    recognizer: Capability<Arc<dyn SpeechRecognizer>>,
    events: UnboundedSender<RecognitionUpdate>,
    state: ListenState,
    session: u64,
}

impl VoiceInput {
    pub fn new(
        recognizer: Capability<Arc<dyn SpeechRecognizer>>,
        events: UnboundedSender<RecognitionUpdate>
    ) -> Self {
        Self { recognizer, events, state: ListenState::Idle, session: 0 }
    }

    pub fn state(&self) -> ListenState {
        self.state
    }

    /// Number of the latest listening session; 0 before the first one.
    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn is_supported(&self) -> bool {
        self.recognizer.is_available()
    }

    /// `idle -> listening`. Leaves the state untouched on any error.
    pub fn start_listening(&mut self) -> Result<(), VoiceError> {
        let recognizer = self.recognizer.as_ref().ok_or(VoiceError::RecognitionUnsupported)?;
        if self.state == ListenState::Listening {
            return Err(VoiceError::AlreadyListening);
        }
        let session = self.session + 1;
        recognizer.start(RecognitionSink::new(session, self.events.clone()))?;
        self.session = session;
        self.state = ListenState::Listening;
        debug!("Speech recognition session {} started", session);
        Ok(())
    }

    /// Applies one recognizer event and returns the transcript to submit, if any.
    ///
    /// Only events of the current session end listening. Anything that
    /// arrives after that session has finished leaves the state alone; a late
    /// transcript is still handed back.
    pub fn finish(&mut self, update: RecognitionUpdate) -> Option<String> {
        let RecognitionUpdate { session, event } = update;
        if self.state == ListenState::Listening {
            if session != self.session {
                debug!("Dropping stale event from recognition session {}", session);
                return None;
            }
            self.state = ListenState::Idle;
        }
        match event {
            RecognitionEvent::Transcript(text) if !text.trim().is_empty() => Some(text),
            RecognitionEvent::Transcript(_) => None,
            RecognitionEvent::Error(e) => {
                warn!("Speech recognition error: {}", e);
                None
            }
            RecognitionEvent::End => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRecognizer;
    use tokio::sync::mpsc;

    fn update(session: u64, event: RecognitionEvent) -> RecognitionUpdate {
        RecognitionUpdate { session, event }
    }

    #[test]
    fn unsupported_platform_fails_fast() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut input = VoiceInput::new(Capability::Unavailable, tx);

        assert_eq!(input.start_listening(), Err(VoiceError::RecognitionUnsupported));
        assert_eq!(input.state(), ListenState::Idle);
    }

    #[tokio::test]
    async fn transcript_returns_to_idle() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let recognizer = Arc::new(ScriptedRecognizer::transcript("refill my prescription"));
        let mut input = VoiceInput::new(Capability::Available(recognizer.clone()), tx);

        input.start_listening().unwrap();
        assert_eq!(input.state(), ListenState::Listening);
        assert_eq!(input.start_listening(), Err(VoiceError::AlreadyListening));
        assert_eq!(recognizer.starts(), 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.session, 1);
        assert_eq!(input.finish(event), Some("refill my prescription".to_string()));
        assert_eq!(input.state(), ListenState::Idle);
    }

    #[test]
    fn error_and_blank_results_yield_nothing() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let recognizer = Arc::new(ScriptedRecognizer::transcript("unused"));
        let mut input = VoiceInput::new(Capability::Available(recognizer), tx);

        input.start_listening().unwrap();
        assert_eq!(input.finish(update(1, RecognitionEvent::Error("no-speech".into()))), None);
        assert_eq!(input.state(), ListenState::Idle);

        input.start_listening().unwrap();
        assert_eq!(input.finish(update(2, RecognitionEvent::Transcript("   ".into()))), None);
        assert_eq!(input.finish(update(2, RecognitionEvent::End)), None);
        assert_eq!(input.state(), ListenState::Idle);
    }

    #[tokio::test]
    async fn late_end_does_not_close_the_next_session() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let recognizer = Arc::new(ScriptedRecognizer::transcript("I need insulin"));
        let mut input = VoiceInput::new(Capability::Available(recognizer.clone()), tx);

        input.start_listening().unwrap();
        let transcript = rx.recv().await.unwrap();
        assert_eq!(input.finish(transcript), Some("I need insulin".to_string()));
        let first_end = rx.recv().await.unwrap();

        input.start_listening().unwrap();
        assert_eq!(input.finish(first_end), None);
        assert_eq!(input.state(), ListenState::Listening);
        assert_eq!(input.start_listening(), Err(VoiceError::AlreadyListening));
        assert_eq!(recognizer.starts(), 2);
    }

    #[test]
    fn end_while_idle_changes_nothing() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let recognizer = Arc::new(ScriptedRecognizer::transcript("unused"));
        let mut input = VoiceInput::new(Capability::Available(recognizer), tx);

        assert_eq!(input.finish(update(7, RecognitionEvent::End)), None);
        assert_eq!(input.finish(update(7, RecognitionEvent::Error("aborted".into()))), None);
        assert_eq!(input.state(), ListenState::Idle);
        assert_eq!(input.session(), 0);
    }

    #[test]
    fn transcript_while_idle_is_still_returned() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut input = VoiceInput::new(Capability::Unavailable, tx);

        let text = input.finish(update(0, RecognitionEvent::Transcript("refill my prescription".into())));

        assert_eq!(text, Some("refill my prescription".to_string()));
        assert_eq!(input.state(), ListenState::Idle);
    }
}
