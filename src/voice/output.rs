use log::warn;
use std::sync::Arc;

use super::{ Capability, VoiceError };

const SPEECH_RATE: f32 = 1.0;
const SPEECH_PITCH: f32 = 1.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), rate: SPEECH_RATE, pitch: SPEECH_PITCH }
    }
}

/// Platform text-to-speech. `cancel` silences whatever is playing.
pub trait SpeechSynthesizer: Send + Sync {
    fn cancel(&self);
    fn speak(&self, utterance: Utterance) -> Result<(), VoiceError>;
}

pub struct SpeechOutput {
    synthesizer: Capability<Arc<dyn SpeechSynthesizer>>,
}

impl SpeechOutput {
    pub fn new(synthesizer: Capability<Arc<dyn SpeechSynthesizer>>) -> Self {
        Self { synthesizer }
    }

    pub fn is_supported(&self) -> bool {
        self.synthesizer.is_available()
    }

    /// Last write wins: the current utterance is cancelled first.
    pub fn speak(&self, text: &str) {
        let Some(synthesizer) = self.synthesizer.as_ref() else {
            return;
        };
        synthesizer.cancel();
        if let Err(e) = synthesizer.speak(Utterance::new(sanitize_for_speech(text))) {
            warn!("{}", e);
        }
    }
}

/// Drops markdown emphasis, heading and bullet markers.
pub fn sanitize_for_speech(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '*' | '#' | '-'))
        .collect()
}
