//! Outbound HTTP plumbing shared by the geo and assistant clients.

use std::time::Duration;

use thiserror::Error;

use crate::config::USER_AGENT;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Cannot reach {service} at {url}")]
    Connection { service: &'static str, url: String },

    #[error("{service} request timed out after {secs}s")]
    Timeout { service: &'static str, secs: u64 },

    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} returned an unreadable response: {detail}")]
    Decode {
        service: &'static str,
        detail: String,
    },

    #[error("{service} request failed: {detail}")]
    Http {
        service: &'static str,
        detail: String,
    },

    #[error("{service} is not configured: {detail}")]
    NotConfigured {
        service: &'static str,
        detail: String,
    },

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Shared async client: bounded timeout, HealthBot user agent.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, UpstreamError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| UpstreamError::Client(e.to_string()))
}

/// A named remote endpoint with the client used to reach it.
#[derive(Debug, Clone)]
pub struct Service {
    pub name: &'static str,
    pub url: String,
    pub client: reqwest::Client,
    pub timeout: Duration,
}

impl Service {
    pub fn new(name: &'static str, url: &str, client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            name,
            url: url.trim_end_matches('/').to_string(),
            client,
            timeout,
        }
    }

    /// Map a transport error the way the caller reports it.
    pub fn classify(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_connect() {
            UpstreamError::Connection {
                service: self.name,
                url: self.url.clone(),
            }
        } else if e.is_timeout() {
            UpstreamError::Timeout {
                service: self.name,
                secs: self.timeout.as_secs(),
            }
        } else if e.is_decode() {
            UpstreamError::Decode {
                service: self.name,
                detail: e.to_string(),
            }
        } else {
            UpstreamError::Http {
                service: self.name,
                detail: e.to_string(),
            }
        }
    }

    /// Send `request`, failing on transport errors and non-2xx statuses.
    pub async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, UpstreamError> {
        let response = request.send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                service: self.name,
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Serve `router` on an ephemeral local port; returns its base URL.
    pub(crate) async fn spawn_mock(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    pub(crate) fn service(name: &'static str, url: &str) -> Service {
        let timeout = Duration::from_secs(2);
        Service::new(name, url, build_client(timeout).unwrap(), timeout)
    }

    #[test]
    fn service_trims_trailing_slash() {
        let svc = service("overpass", "http://localhost:9999/");
        assert_eq!(svc.url, "http://localhost:9999");
    }

    #[tokio::test]
    async fn non_success_status_carries_body() {
        use axum::http::StatusCode;
        use axum::routing::get;

        let url = spawn_mock(axum::Router::new().route(
            "/",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        ))
        .await;
        let svc = service("overpass", &url);
        let err = svc.send(svc.client.get(&svc.url)).await.unwrap_err();
        match err {
            UpstreamError::Status { status, body, .. } => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn refused_connection_is_connection_error() {
        // Bind then drop to obtain a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let svc = service("nominatim", &format!("http://{addr}"));
        let err = svc.send(svc.client.get(&svc.url)).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Connection { service: "nominatim", .. }));
    }
}
