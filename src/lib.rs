pub mod api;
pub mod artifacts;
pub mod assistant;
pub mod config;
pub mod geo;
pub mod imaging;
pub mod normalize;
pub mod predict;
pub mod upstream;

#[cfg(test)]
mod test_support;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::{ApiContext, ServerError};
use crate::config::AppConfig;
use crate::upstream::UpstreamError;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Cannot build HTTP client: {0}")]
    Client(#[from] UpstreamError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Load configuration, warm the artifact cache and serve until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    // Initialize tracing first: config parsing logs its fallbacks.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(config::log_filter_from(|key| std::env::var(key).ok()))
        }))
        .init();

    let config = AppConfig::from_env();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let addr = config.bind_addr();
    let ctx = ApiContext::new(config)?;

    // Missing artifacts only disable their endpoints.
    let predictor = ctx.predictor.clone();
    match tokio::task::spawn_blocking(move || predictor.artifacts().warm_up()).await {
        Ok(failures) if !failures.is_empty() => {
            tracing::warn!(
                unavailable = failures.len(),
                "Some endpoints will answer 503 until their artifacts are installed"
            );
        }
        Ok(_) => {}
        Err(e) => tracing::error!("Artifact warm-up task failed: {e}"),
    }

    api::serve(ctx, addr).await?;
    Ok(())
}
