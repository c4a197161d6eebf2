//! Shared state for the HTTP layer.

use std::sync::Arc;

use crate::artifacts::ArtifactCache;
use crate::assistant::Assistant;
use crate::config::AppConfig;
use crate::geo::GeoLookup;
use crate::predict::Predictor;
use crate::upstream::{build_client, UpstreamError};

/// Shared context for all API routes and middleware. Cheap to clone.
#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<AppConfig>,
    pub predictor: Predictor,
    pub geo: GeoLookup,
    pub assistant: Assistant,
    /// RFC 3339 process start time, reported by `/health`.
    pub started_at: Arc<str>,
}

impl ApiContext {
    /// Wire the production services from configuration. One HTTP client
    /// is shared by every outbound integration.
    pub fn new(config: AppConfig) -> Result<Self, UpstreamError> {
        let client = build_client(config.http_timeout)?;
        let artifacts = Arc::new(ArtifactCache::new(config.models_dir.clone()));
        let geo = GeoLookup::from_config(&config, client.clone());
        let assistant = Assistant::from_config(&config, client);
        Ok(Self::from_parts(config, artifacts, geo, assistant))
    }

    pub fn from_parts(
        config: AppConfig,
        artifacts: Arc<ArtifactCache>,
        geo: GeoLookup,
        assistant: Assistant,
    ) -> Self {
        Self {
            config: Arc::new(config),
            predictor: Predictor::new(artifacts),
            geo,
            assistant,
            started_at: chrono::Utc::now().to_rfc3339().into(),
        }
    }

    pub fn artifacts(&self) -> &ArtifactCache {
        self.predictor.artifacts()
    }
}
