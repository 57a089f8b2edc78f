pub mod cli;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod session;
pub mod store;
pub mod terminal;
pub mod voice;

#[cfg(test)]
pub(crate) mod testing;

use cli::Args;
use client::HttpPharmacyClient;
use config::AppConfig;
use log::info;
use session::SessionController;
use std::error::Error;
use std::sync::Arc;
use terminal::Terminal;
use tokio::sync::mpsc;
use voice::command::{ recognizer_from_config, synthesizer_from_config };
use voice::{ SpeechOutput, VoiceInput };

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = AppConfig::from_args(&args)?;

    info!("--- Client Configuration ---");
    info!("Environment: {}", config.client.environment);
    info!("API Base URL: {}", config.client.base_url);
    info!("Request Timeout: {:?}", config.client.request_timeout);
    info!("Session File: {}", config.session_file.display());
    match config.refresh_interval {
        Some(every) => info!("Dashboard Refresh: every {:?}", every),
        None => info!("Dashboard Refresh: on demand only"),
    }
    info!("Speech Output: {}", config.speech.tts_command.as_deref().unwrap_or("disabled"));
    info!("Speech Input: {}", config.speech.stt_command.as_deref().unwrap_or("disabled"));
    info!("----------------------------");

    let client = Arc::new(HttpPharmacyClient::from_config(&config.client)?);
    let store = store::initialize_session_store(&config.session_file);

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (voice_tx, voice_rx) = mpsc::unbounded_channel();
    let voice_input = VoiceInput::new(recognizer_from_config(&config.speech), voice_tx);
    let speech_output = SpeechOutput::new(synthesizer_from_config(&config.speech));

    let controller = SessionController::new(client, store, voice_input, speech_output, event_tx);
    info!("Starting RxGenie client session {}", controller.client_session_id());

    Terminal::new(controller, event_rx, voice_rx, config.refresh_interval).run().await
}
