use log::{ debug, info, warn };
use std::process::Stdio;
use std::sync::{ Arc, Mutex };
use tokio::io::AsyncWriteExt;
use tokio::process::{ Child, Command };

use super::{
    Capability,
    RecognitionEvent,
    RecognitionSink,
    SpeechRecognizer,
    SpeechSynthesizer,
    Utterance,
    VoiceError,
};
use crate::config::SpeechConfig;

fn shell(command_line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command_line);
    cmd
}

/// Speaks by piping the utterance into an external TTS command.
pub struct CommandSynthesizer {
    command_line: String,
    current: Mutex<Option<Child>>,
}

impl CommandSynthesizer {
    pub fn new(command_line: impl Into<String>) -> Self {
        Self { command_line: command_line.into(), current: Mutex::new(None) }
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn cancel(&self) {
        let mut current = self.current.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(mut child) = current.take() {
            if let Err(e) = child.start_kill() {
                debug!("TTS process already gone: {}", e);
            }
        }
    }

    fn speak(&self, utterance: Utterance) -> Result<(), VoiceError> {
        let mut child = shell(&self.command_line)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| VoiceError::Synthesis(format!("failed to spawn '{}': {}", self.command_line, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            let text = utterance.text;
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(text.as_bytes()).await {
                    debug!("TTS stdin closed early: {}", e);
                }
            });
        }

        let mut current = self.current.lock().unwrap_or_else(|p| p.into_inner());
        *current = Some(child);
        Ok(())
    }
}

/// Records one utterance by running an external STT command and reading
/// the transcript from its stdout.
pub struct CommandRecognizer {
    command_line: String,
}

impl CommandRecognizer {
    pub fn new(command_line: impl Into<String>) -> Self {
        Self { command_line: command_line.into() }
    }
}

impl SpeechRecognizer for CommandRecognizer {
    fn start(&self, sink: RecognitionSink) -> Result<(), VoiceError> {
        let child = shell(&self.command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| VoiceError::Recognition(format!("failed to spawn '{}': {}", self.command_line, e)))?;

        tokio::spawn(async move {
            let event = match child.wait_with_output().await {
                Ok(output) if output.status.success() => {
                    RecognitionEvent::Transcript(String::from_utf8_lossy(&output.stdout).trim().to_string())
                }
                Ok(output) => {
                    RecognitionEvent::Error(
                        format!("{}: {}", output.status, String::from_utf8_lossy(&output.stderr).trim())
                    )
                }
                Err(e) => RecognitionEvent::Error(e.to_string()),
            };
            if sink.send(event) {
                sink.send(RecognitionEvent::End);
            }
        });
        Ok(())
    }
}

pub fn synthesizer_from_config(config: &SpeechConfig) -> Capability<Arc<dyn SpeechSynthesizer>> {
    match &config.tts_command {
        Some(command_line) => {
            info!("Speech output via: {}", command_line);
            Capability::Available(Arc::new(CommandSynthesizer::new(command_line.as_str())))
        }
        None => {
            warn!("No TTS command configured; replies will not be spoken.");
            Capability::Unavailable
        }
    }
}

pub fn recognizer_from_config(config: &SpeechConfig) -> Capability<Arc<dyn SpeechRecognizer>> {
    match &config.stt_command {
        Some(command_line) => {
            info!("Speech input via: {}", command_line);
            Capability::Available(Arc::new(CommandRecognizer::new(command_line.as_str())))
        }
        None => Capability::Unavailable,
    }
}
