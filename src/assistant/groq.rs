//! Groq's OpenAI-compatible API: chat completions and Whisper transcription.

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::upstream::{Service, UpstreamError};

pub const CHAT_MODEL: &str = "llama3-8b-8192";
pub const TRANSCRIPTION_MODEL: &str = "whisper-large-v3-turbo";
pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 200;

pub fn system_prompt(language: &str) -> String {
    format!("You are a health bot. Provide short, clear answers in {language}.")
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GroqClient {
    service: Service,
    api_key: Option<String>,
}

impl GroqClient {
    pub fn new(service: Service, api_key: Option<String>) -> Self {
        Self { service, api_key }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, UpstreamError> {
        self.api_key.as_deref().ok_or(UpstreamError::NotConfigured {
            service: self.service.name,
            detail: "GROQ_API_KEY is not set".into(),
        })
    }

    /// One-shot answer to `text` in `language`.
    pub async fn complete(&self, text: &str, language: &str) -> Result<String, UpstreamError> {
        let key = self.api_key()?;
        let prompt = system_prompt(language);
        let body = ChatRequest {
            model: CHAT_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let request = self
            .service
            .client
            .post(format!("{}/chat/completions", self.service.url))
            .bearer_auth(key)
            .json(&body);
        let response: ChatResponse = self
            .service
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| self.service.classify(e))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(UpstreamError::Decode {
                service: self.service.name,
                detail: "completion has no message content".into(),
            })
    }

    /// Speech-to-text for an uploaded recording.
    pub async fn transcribe(&self, audio: Vec<u8>) -> Result<String, UpstreamError> {
        let key = self.api_key()?;
        let file = Part::bytes(audio)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| self.service.classify(e))?;
        let form = Form::new()
            .text("model", TRANSCRIPTION_MODEL)
            .text("response_format", "text")
            .part("file", file);

        let request = self
            .service
            .client
            .post(format!("{}/audio/transcriptions", self.service.url))
            .bearer_auth(key)
            .multipart(form);
        let text = self
            .service
            .send(request)
            .await?
            .text()
            .await
            .map_err(|e| self.service.classify(e))?;
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::upstream::tests::{service, spawn_mock};
    use axum::extract::Multipart;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn authorized(headers: &HeaderMap) -> bool {
        headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bearer test-key")
    }

    /// Mock Groq: echoes the chat request back in the completion and
    /// transcribes any upload to a fixed phrase.
    pub(crate) fn mock_router(transcript: &'static str) -> Router {
        Router::new()
            .route(
                "/chat/completions",
                post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                    if !authorized(&headers) {
                        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
                    }
                    let user = body["messages"][1]["content"].as_str().unwrap_or_default();
                    let reply = format!(
                        "{}|{}|{}|{}|{}",
                        body["model"].as_str().unwrap_or_default(),
                        body["messages"][0]["content"].as_str().unwrap_or_default(),
                        user,
                        body["temperature"],
                        body["max_tokens"]
                    );
                    (
                        StatusCode::OK,
                        Json(json!({ "choices": [{ "message": { "role": "assistant", "content": reply } }] })),
                    )
                }),
            )
            .route(
                "/audio/transcriptions",
                post(move |headers: HeaderMap, mut multipart: Multipart| async move {
                    if !authorized(&headers) {
                        return (StatusCode::UNAUTHORIZED, String::new());
                    }
                    let mut fields = Vec::new();
                    while let Ok(Some(field)) = multipart.next_field().await {
                        let name = field.name().unwrap_or_default().to_string();
                        let data = field.bytes().await.unwrap_or_default();
                        fields.push((name, data));
                    }
                    let has = |n: &str, v: &[u8]| fields.iter().any(|(k, d)| k == n && d.as_ref() == v);
                    let file_ok = fields.iter().any(|(k, d)| k == "file" && !d.is_empty());
                    if has("model", TRANSCRIPTION_MODEL.as_bytes())
                        && has("response_format", b"text")
                        && file_ok
                    {
                        (StatusCode::OK, format!("{transcript}\n"))
                    } else {
                        (StatusCode::BAD_REQUEST, "bad form".to_string())
                    }
                }),
            )
    }

    pub(crate) async fn mock_client(transcript: &'static str) -> GroqClient {
        let url = spawn_mock(mock_router(transcript)).await;
        GroqClient::new(service("groq", &url), Some("test-key".into()))
    }

    #[test]
    fn prompt_names_language() {
        assert_eq!(
            system_prompt("fr"),
            "You are a health bot. Provide short, clear answers in fr."
        );
    }

    #[tokio::test]
    async fn completion_sends_model_prompt_and_limits() {
        let client = mock_client("unused").await;
        let reply = client.complete("Is coffee bad?", "en").await.unwrap();
        assert_eq!(
            reply,
            "llama3-8b-8192|You are a health bot. Provide short, clear answers in en.|Is coffee bad?|0.7|200"
        );
    }

    #[tokio::test]
    async fn transcription_posts_multipart_and_trims() {
        let client = mock_client("my head hurts").await;
        let text = client.transcribe(b"RIFF fake wav".to_vec()).await.unwrap();
        assert_eq!(text, "my head hurts");
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let client = GroqClient::new(service("groq", "http://127.0.0.1:9"), None);
        assert!(!client.is_configured());
        let err = client.complete("hi", "en").await.unwrap_err();
        assert!(matches!(err, UpstreamError::NotConfigured { .. }));
    }

    #[tokio::test]
    async fn rejected_key_is_status_error() {
        let url = spawn_mock(mock_router("x")).await;
        let client = GroqClient::new(service("groq", &url), Some("wrong".into()));
        let err = client.complete("hi", "en").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status { status: 401, .. }));
    }
}
