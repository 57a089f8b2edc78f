pub mod command;
pub mod input;
pub mod output;

use thiserror::Error;

pub use self::input::{
    ListenState,
    RecognitionEvent,
    RecognitionSink,
    RecognitionUpdate,
    SpeechRecognizer,
    VoiceInput,
};
pub use self::output::{ sanitize_for_speech, SpeechOutput, SpeechSynthesizer, Utterance };

/// Whether the platform offers a speech feature. The controller only ever
/// branches on this value, never on the environment itself.
#[derive(Debug, Clone)]
pub enum Capability<T> {
    Available(T),
    Unavailable,
}

impl<T> Capability<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }

    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Capability::Available(inner) => Some(inner),
            Capability::Unavailable => None,
        }
    }
}

impl<T> From<Option<T>> for Capability<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => Capability::Available(inner),
            None => Capability::Unavailable,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VoiceError {
    #[error("Speech recognition not supported.")]
    RecognitionUnsupported,

    #[error("already listening")]
    AlreadyListening,

    #[error("speech recognition failed: {0}")]
    Recognition(String),

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),
}
