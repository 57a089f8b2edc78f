use clap::ValueEnum;
use log::info;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::cli::Args;

pub const DEFAULT_LOCAL_BASE_URL: &str = "http://localhost:8002";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunEnvironment {
    /// Backend runs next to the client during development.
    Local,
    /// Backend is reached through a deployed address.
    Deployed,
}

impl fmt::Display for RunEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunEnvironment::Local => write!(f, "local"),
            RunEnvironment::Deployed => write!(f, "deployed"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API_BASE_URL is required when running in the deployed environment")]
    MissingBaseUrl,

    #[error("invalid base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("base url '{0}' must use http or https")]
    UnsupportedScheme(String),
}

/// Settings for the remote client. Resolved once at startup.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub environment: RunEnvironment,
    pub base_url: Url,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn resolve(
        environment: RunEnvironment,
        base_url_override: Option<&str>,
        request_timeout: Duration
    ) -> Result<Self, ConfigError> {
        let raw = match (environment, base_url_override.map(str::trim).filter(|s| !s.is_empty())) {
            (_, Some(url)) => url.to_string(),
            (RunEnvironment::Local, None) => DEFAULT_LOCAL_BASE_URL.to_string(),
            (RunEnvironment::Deployed, None) => {
                return Err(ConfigError::MissingBaseUrl);
            }
        };

        let base_url = Url::parse(&raw).map_err(|source| ConfigError::InvalidBaseUrl {
            url: raw.clone(),
            source,
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(raw));
        }

        info!("Resolved {} API base: {}", environment, base_url);
        Ok(Self { environment, base_url, request_timeout })
    }

    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        Self::resolve(
            args.environment,
            args.api_base_url.as_deref(),
            Duration::from_secs(args.request_timeout_secs)
        )
    }
}

/// Optional external commands backing the speech capabilities.
#[derive(Debug, Clone, Default)]
pub struct SpeechConfig {
    pub tts_command: Option<String>,
    pub stt_command: Option<String>,
}

impl SpeechConfig {
    pub fn from_args(args: &Args) -> Self {
        Self {
            tts_command: args.tts_command.clone().filter(|c| !c.trim().is_empty()),
            stt_command: args.stt_command.clone().filter(|c| !c.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub speech: SpeechConfig,
    pub session_file: PathBuf,
    pub refresh_interval: Option<Duration>,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let refresh_interval = match args.refresh_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Ok(Self {
            client: ClientConfig::from_args(args)?,
            speech: SpeechConfig::from_args(args),
            session_file: PathBuf::from(&args.session_file),
            refresh_interval,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(30);

    #[test]
    fn local_defaults_to_development_backend() {
        let config = ClientConfig::resolve(RunEnvironment::Local, None, TIMEOUT).unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8002/");
    }

    #[test]
    fn blank_override_counts_as_missing() {
        let config = ClientConfig::resolve(RunEnvironment::Local, Some("  "), TIMEOUT).unwrap();
        assert_eq!(config.base_url.host_str(), Some("localhost"));

        let err = ClientConfig::resolve(RunEnvironment::Deployed, Some(""), TIMEOUT).unwrap_err();
        assert!(matches!(err, ConfigError::MissingBaseUrl));
    }

    #[test]
    fn deployed_uses_override() {
        let config = ClientConfig::resolve(
            RunEnvironment::Deployed,
            Some("https://rxgenie.example.com"),
            TIMEOUT
        ).unwrap();
        assert_eq!(config.base_url.host_str(), Some("rxgenie.example.com"));
    }

    #[test]
    fn rejects_bad_urls() {
        let err = ClientConfig::resolve(RunEnvironment::Local, Some("not a url"), TIMEOUT).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));

        let err = ClientConfig::resolve(RunEnvironment::Local, Some("ftp://host"), TIMEOUT).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedScheme(_)));
    }
}
