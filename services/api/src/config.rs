use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Defines the supported OpenAI-compatible backend providers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Groq,
}

impl Provider {
    /// Base URL of the provider's OpenAI-compatible API.
    pub fn api_base(&self) -> &'static str {
        match self {
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::Groq => "https://api.groq.com/openai/v1",
        }
    }

    fn default_chat_model(&self) -> &'static str {
        match self {
            Provider::OpenAI => "gpt-4o-mini",
            Provider::Groq => "llama3-8b-8192",
        }
    }

    fn default_transcription_model(&self) -> &'static str {
        match self {
            Provider::OpenAI => "whisper-1",
            Provider::Groq => "whisper-large-v3",
        }
    }

    fn default_speech_model(&self) -> &'static str {
        match self {
            Provider::OpenAI => "tts-1",
            Provider::Groq => "playai-tts",
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub provider: Provider,
    pub openai_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub chat_model: String,
    pub transcription_model: String,
    pub speech_model: String,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let provider_str = std::env::var("PROVIDER").unwrap_or_else(|_| "groq".to_string());
        let provider = match provider_str.to_lowercase().as_str() {
            "openai" => Provider::OpenAI,
            _ => Provider::Groq,
        };

        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let groq_api_key = std::env::var("GROQ_API_KEY").ok();

        let chat_model = std::env::var("CHAT_MODEL")
            .unwrap_or_else(|_| provider.default_chat_model().to_string());
        let transcription_model = std::env::var("TRANSCRIPTION_MODEL")
            .unwrap_or_else(|_| provider.default_transcription_model().to_string());
        let speech_model = std::env::var("SPEECH_MODEL")
            .unwrap_or_else(|_| provider.default_speech_model().to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        match provider {
            Provider::OpenAI => {
                if openai_api_key.is_none() {
                    return Err(ConfigError::MissingVar(
                        "OPENAI_API_KEY must be set for 'openai' provider".to_string(),
                    ));
                }
            }
            Provider::Groq => {
                if groq_api_key.is_none() {
                    return Err(ConfigError::MissingVar(
                        "GROQ_API_KEY must be set for 'groq' provider".to_string(),
                    ));
                }
            }
        }

        Ok(Self {
            bind_address,
            provider,
            openai_api_key,
            groq_api_key,
            chat_model,
            transcription_model,
            speech_model,
            log_level,
        })
    }

    /// The API key matching the selected provider.
    ///
    /// `from_env` guarantees the matching key is present.
    pub fn api_key(&self) -> &str {
        match self.provider {
            Provider::OpenAI => self.openai_api_key.as_deref().unwrap_or_default(),
            Provider::Groq => self.groq_api_key.as_deref().unwrap_or_default(),
        }
    }
}
