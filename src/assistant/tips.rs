//! Canned health tips keyed by symptom keyword.

use std::collections::BTreeMap;
use std::path::Path;

use super::AssistantError;

/// Keyword → tip. Keys are lower-cased and iterated in sorted order, so the
/// winning tip for an input mentioning several keywords is stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthTips {
    tips: BTreeMap<String, String>,
}

impl HealthTips {
    pub fn new<I, K, V>(tips: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            tips: tips
                .into_iter()
                .map(|(k, v)| (k.into().trim().to_lowercase(), v.into()))
                .filter(|(k, _)| !k.is_empty())
                .collect(),
        }
    }

    /// Read a JSON object of keyword → tip.
    pub fn load(path: &Path) -> Result<Self, AssistantError> {
        let tips_error = |detail: String| AssistantError::Tips {
            path: path.to_path_buf(),
            detail,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| tips_error(e.to_string()))?;
        let map: BTreeMap<String, String> =
            serde_json::from_str(&raw).map_err(|e| tips_error(e.to_string()))?;
        Ok(Self::new(map))
    }

    /// Load from an optional path; an unreadable file leaves the assistant
    /// without tips.
    pub fn load_optional(path: Option<&Path>) -> Self {
        match path {
            None => Self::default(),
            Some(path) => match Self::load(path) {
                Ok(tips) => {
                    tracing::info!(path = %path.display(), count = tips.len(), "Health tips loaded");
                    tips
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Health tips unavailable, continuing without");
                    Self::default()
                }
            },
        }
    }

    /// First tip whose keyword occurs in `text`, case-insensitively.
    pub fn lookup(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.tips
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword.as_str()))
            .map(|(_, tip)| tip.as_str())
    }

    pub fn len(&self) -> usize {
        self.tips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tips.is_empty()
    }
}
