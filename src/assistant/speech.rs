//! Text-to-speech through a Google Translate style `translate_tts` endpoint.
//!
//! The endpoint only accepts short inputs, so text is split into chunks of
//! at most [`MAX_CHUNK_CHARS`] characters and the returned MP3 segments are
//! concatenated in order.

use futures_util::future::try_join_all;

use crate::upstream::{Service, UpstreamError};

pub const MAX_CHUNK_CHARS: usize = 100;

/// Split on whitespace into chunks of at most `max` characters. A single
/// word longer than `max` is cut at character boundaries.
pub fn chunk_text(text: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { word_len + 1 };
        if current_len + needed > max {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[derive(Debug, Clone)]
pub struct SpeechClient {
    service: Service,
}

impl SpeechClient {
    pub fn new(service: Service) -> Self {
        Self { service }
    }

    /// MP3 audio for `text` spoken in `language`.
    pub async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, UpstreamError> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        let total = chunks.len();

        let requests = chunks
            .iter()
            .enumerate()
            .map(|(idx, chunk)| self.fetch_chunk(chunk, language, idx, total));
        let segments = try_join_all(requests).await?;

        tracing::debug!(chunks = total, language, "Speech synthesized");
        Ok(segments.concat())
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        language: &str,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>, UpstreamError> {
        let idx = idx.to_string();
        let total = total.to_string();
        let textlen = chunk.chars().count().to_string();
        let request = self.service.client.get(&self.service.url).query(&[
            ("ie", "UTF-8"),
            ("q", chunk),
            ("tl", language),
            ("client", "tw-ob"),
            ("total", total.as_str()),
            ("idx", idx.as_str()),
            ("textlen", textlen.as_str()),
        ]);
        let bytes = self
            .service
            .send(request)
            .await?
            .bytes()
            .await
            .map_err(|e| self.service.classify(e))?;
        Ok(bytes.to_vec())
    }
}
