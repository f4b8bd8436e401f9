//! Speech Synthesis Client
//!
//! Optional text-to-speech capability used to read the current question
//! aloud. Purely downstream of question display; the session state machine
//! never depends on it.

use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{CreateSpeechRequestArgs, SpeechModel, Voice},
};
use async_trait::async_trait;
use thiserror::Error;

/// Failure of a single synthesis round trip.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("speech synthesis request failed: {0}")]
    Api(#[from] OpenAIError),
}

/// A generic client for the text-to-speech capability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SynthesisClient: Send + Sync {
    /// Synthesizes `text` into encoded audio bytes (MP3 by default).
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError>;
}

/// An implementation of `SynthesisClient` for an OpenAI-compatible
/// speech endpoint.
pub struct OpenAiCompatibleSynthesis {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCompatibleSynthesis {
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

#[async_trait]
impl SynthesisClient for OpenAiCompatibleSynthesis {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let request = CreateSpeechRequestArgs::default()
            .input(text)
            .voice(Voice::Alloy)
            .model(SpeechModel::Other(self.model.clone()))
            .build()?;

        let response = self.client.audio().speech(request).await?;
        Ok(response.bytes.to_vec())
    }
}
