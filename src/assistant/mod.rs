//! Health chat assistant: canned tips first, then the LLM, with an optional
//! voice round trip (transcription in, synthesized speech out).

pub mod groq;
pub mod speech;
pub mod tips;

use std::path::PathBuf;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::config::AppConfig;
use crate::upstream::{Service, UpstreamError};

pub use groq::GroqClient;
pub use speech::SpeechClient;
pub use tips::HealthTips;

pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("No input provided")]
    EmptyInput,

    #[error("Invalid audio encoding: {0}")]
    InvalidAudio(String),

    #[error("Could not transcribe any speech from the recording")]
    EmptyTranscript,

    #[error("Health tips file {path}: {detail}")]
    Tips { path: PathBuf, detail: String },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputType {
    #[default]
    Text,
    Voice,
}

/// Only the exact string `"voice"` selects voice; anything else, including
/// `null` or a number, is text.
fn lenient_input_type<'de, D>(deserializer: D) -> Result<InputType, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value.as_ref().and_then(serde_json::Value::as_str) {
        Some("voice") => InputType::Voice,
        _ => InputType::Text,
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "lenient_input_type")]
    pub input_type: InputType,
    /// Message text, or base64 audio for voice input.
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl ChatRequest {
    pub fn language(&self) -> &str {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChatReply {
    Voice {
        transcribed_text: String,
        response_text: String,
        /// Base64 MP3.
        response_audio: String,
    },
    Text {
        response_text: String,
    },
}

#[derive(Debug, Clone)]
pub struct Assistant {
    tips: Arc<HealthTips>,
    groq: GroqClient,
    speech: SpeechClient,
}

impl Assistant {
    pub fn new(tips: HealthTips, groq: GroqClient, speech: SpeechClient) -> Self {
        Self {
            tips: Arc::new(tips),
            groq,
            speech,
        }
    }

    pub fn from_config(config: &AppConfig, client: reqwest::Client) -> Self {
        let groq = GroqClient::new(
            Service::new("groq", &config.groq_url, client.clone(), config.http_timeout),
            config.groq_api_key.clone(),
        );
        if !groq.is_configured() {
            tracing::warn!("GROQ_API_KEY not set; chat answers limited to health tips");
        }
        let speech = SpeechClient::new(Service::new(
            "tts",
            &config.tts_url,
            client,
            config.http_timeout,
        ));
        Self::new(
            HealthTips::load_optional(config.health_tips_path.as_deref()),
            groq,
            speech,
        )
    }

    /// Tip for `text` if one matches, otherwise an LLM answer.
    pub async fn reply(&self, text: &str, language: &str) -> Result<String, AssistantError> {
        if let Some(tip) = self.tips.lookup(text) {
            tracing::debug!("Answered from health tips");
            return Ok(tip.to_string());
        }
        Ok(self.groq.complete(text, language).await?)
    }

    pub async fn handle(&self, request: ChatRequest) -> Result<ChatReply, AssistantError> {
        let language = request.language().to_string();
        let input = request
            .input
            .as_deref()
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .ok_or(AssistantError::EmptyInput)?;

        match request.input_type {
            InputType::Text => Ok(ChatReply::Text {
                response_text: self.reply(input, &language).await?,
            }),
            InputType::Voice => {
                let audio = BASE64
                    .decode(input)
                    .map_err(|e| AssistantError::InvalidAudio(e.to_string()))?;
                let transcribed_text = self.groq.transcribe(audio).await?;
                if transcribed_text.is_empty() {
                    return Err(AssistantError::EmptyTranscript);
                }
                let response_text = self.reply(&transcribed_text, &language).await?;
                let speech = self.speech.synthesize(&response_text, &language).await?;
                tracing::info!(
                    transcript_chars = transcribed_text.len(),
                    audio_bytes = speech.len(),
                    "Voice chat answered"
                );
                Ok(ChatReply::Voice {
                    transcribed_text,
                    response_text,
                    response_audio: BASE64.encode(speech),
                })
            }
        }
    }
}
