use clap::Parser;

use crate::config::RunEnvironment;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Backend Args ---
    /// Where the pharmacy backend runs (local, deployed)
    #[arg(long, env = "RXGENIE_ENV", value_enum, default_value = "local")]
    pub environment: RunEnvironment,

    /// Base URL of the pharmacy backend. Required for the deployed environment.
    #[arg(long, env = "API_BASE_URL")] // Local falls back to http://localhost:8002
    pub api_base_url: Option<String>,

    /// Timeout in seconds for each backend request.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    // --- Session Args ---
    /// File holding the signed-in user between runs.
    #[arg(long, env = "SESSION_FILE", default_value = ".rxgenie_session.json")]
    pub session_file: String,

    /// Seconds between background dashboard refreshes. 0 disables them.
    #[arg(long, env = "DASHBOARD_REFRESH_SECS", default_value = "60")]
    pub refresh_interval_secs: u64,

    // --- Speech Args ---
    /// Command that speaks the text it receives on stdin (e.g. "espeak-ng --stdin").
    #[arg(long, env = "TTS_COMMAND")]
    pub tts_command: Option<String>,

    /// Command that records one utterance and prints the transcript on stdout.
    #[arg(long, env = "STT_COMMAND")]
    pub stt_command: Option<String>,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_local_backend() {
        let args = Args::parse_from(["rxgenie-client"]);
        assert_eq!(args.environment, RunEnvironment::Local);
        assert_eq!(args.request_timeout_secs, 30);
        assert_eq!(args.refresh_interval_secs, 60);
        assert!(args.tts_command.is_none());
    }

    #[test]
    fn parses_deployed_environment() {
        let args = Args::parse_from([
            "rxgenie-client",
            "--environment",
            "deployed",
            "--api-base-url",
            "https://pharmacy.example.com",
        ]);
        assert_eq!(args.environment, RunEnvironment::Deployed);
        assert_eq!(args.api_base_url.as_deref(), Some("https://pharmacy.example.com"));
    }
}
