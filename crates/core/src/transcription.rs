//! Transcription Client
//!
//! Wraps the speech-to-text capability. One complete audio clip goes in,
//! one transcript comes out. Silence legitimately transcribes to an empty
//! string; that case is decided downstream by the session controller, not
//! treated as an error here.

use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{AudioInput, CreateTranscriptionRequestArgs},
};
use async_trait::async_trait;
use thiserror::Error;

/// One finalized audio recording, ready for transcription.
///
/// The filename carries the container format hint (e.g. "answer.wav",
/// "answer.mp3") that the transcription service uses to decode the bytes.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl AudioClip {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// Failure of a single transcription round trip.
#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("transcription request failed: {0}")]
    Api(#[from] OpenAIError),
}

/// A generic client for the speech-to-text capability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptionClient: Send + Sync {
    /// Transcribes one complete audio clip, returning the trimmed transcript.
    /// An empty transcript is a valid result, not an error.
    async fn transcribe(&self, clip: AudioClip) -> Result<String, TranscriptionError>;
}

/// An implementation of `TranscriptionClient` for any OpenAI-compatible
/// audio transcription endpoint (Whisper and friends).
pub struct OpenAiCompatibleTranscription {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCompatibleTranscription {
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

#[async_trait]
impl TranscriptionClient for OpenAiCompatibleTranscription {
    async fn transcribe(&self, clip: AudioClip) -> Result<String, TranscriptionError> {
        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8(clip.filename, clip.bytes))
            .model(&self.model)
            .build()?;

        let response = self.client.audio().transcribe(request).await?;
        Ok(response.text.trim().to_string())
    }
}
