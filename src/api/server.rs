//! HTTP server lifecycle: bind, then serve the router until a shutdown
//! signal (Ctrl-C for the binary).

use std::future::Future;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::api::router::build_router;
use crate::api::types::ApiContext;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Bind `addr`. Port 0 picks an ephemeral port; the bound address is
/// returned alongside the listener.
pub async fn bind(addr: SocketAddr) -> Result<(TcpListener, SocketAddr), ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let local = listener
        .local_addr()
        .map_err(|source| ServerError::Bind { addr, source })?;
    Ok((listener, local))
}

/// Serve the full router on an already bound listener until `shutdown`
/// resolves. In-flight requests complete before this returns.
pub async fn serve_on<F>(
    ctx: ApiContext,
    listener: TcpListener,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(ctx);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)
}

/// Serve on `addr` until Ctrl-C.
pub async fn serve(ctx: ApiContext, addr: SocketAddr) -> Result<(), ServerError> {
    let (listener, addr) = bind(addr).await?;

    tracing::info!(%addr, "HealthBot API listening");
    serve_on(ctx, listener, ctrl_c()).await?;
    tracing::info!("HealthBot API stopped");
    Ok(())
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Ctrl-C received, shutting down"),
        Err(e) => {
            tracing::error!("Cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use tokio::sync::oneshot;

    fn test_context(dir: &tempfile::TempDir) -> ApiContext {
        let config = AppConfig {
            models_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        ApiContext::new(config).unwrap()
    }

    #[tokio::test]
    async fn bound_server_answers_health_then_stops_on_signal() {
        let dir = tempfile::tempdir().unwrap();
        let (listener, addr) = bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        assert_ne!(addr.port(), 0);

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve_on(test_context(&dir), listener, async move {
            let _ = stop_rx.await;
        }));

        let url = format!("http://{addr}/health");
        let response = reqwest::get(&url).await.unwrap();
        assert_eq!(response.status(), 200);
        let json: serde_json::Value = response.json().await.unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["loaded_artifacts"], serde_json::json!([]));

        stop_tx.send(()).unwrap();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
        assert!(reqwest::get(&url).await.is_err());
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();

        let result = bind(addr).await;
        assert!(matches!(result, Err(ServerError::Bind { addr: a, .. }) if a == addr));
    }

    #[tokio::test]
    async fn serve_reports_bind_failure() {
        let dir = tempfile::tempdir().unwrap();
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();

        let result = serve(test_context(&dir), addr).await;
        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }
}
