//! Completion Client
//!
//! Wraps the text-completion capability behind a narrow trait so the session
//! controller can be tested without network access. The concrete client
//! works against any OpenAI-compatible chat API (OpenAI, Groq, ...).

use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
};
use async_trait::async_trait;
use thiserror::Error;

/// Failure of a single completion round trip.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Transport, authentication, or request-building failure.
    #[error("completion request failed: {0}")]
    Api(#[from] OpenAIError),
    /// The service responded, but with no usable message text.
    #[error("completion response contained no usable text")]
    EmptyResponse,
}

/// A generic client for the text-completion capability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Performs one round trip: sends `prompt`, returns the first generated
    /// message's text, trimmed of surrounding whitespace.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// An implementation of `CompletionClient` for any OpenAI-compatible API.
pub struct OpenAiCompatibleCompletion {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCompatibleCompletion {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - API key and base URL for the service.
    /// * `model` - The chat model identifier (e.g. "llama3-8b-8192").
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatibleCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into(),
            ])
            .build()?;

        let response = self.client.chat().create(request).await?;

        let text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(str::trim)
            .unwrap_or_default();

        if text.is_empty() {
            return Err(CompletionError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}
