//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the API handlers
//! - Wire up middleware (CORS headers, timeout, request ID, tracing)
//! - Bind server to listener
//! - Bounded graceful shutdown: stop accepting, drain, give up at the deadline

use axum::{
    http::{header, HeaderValue, StatusCode},
    routing::get,
    Router,
};
use std::future::IntoFuture;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::http::handlers;
use crate::http::request::MakeRequestUuid;
use crate::store::LogReader;

/// Path serving the connection log.
pub const CONNECTION_DATA_PATH: &str = "/api/connection-data";

/// Errors from running the API server.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("in-flight requests still running after {0:?} shutdown deadline")]
    ShutdownTimeout(Duration),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub reader: LogReader,
}

/// Read-only HTTP API over the connection log.
pub struct ApiServer {
    router: Router,
    shutdown_timeout: Duration,
}

impl ApiServer {
    /// Create a new API server reading from `log_file`.
    pub fn new(config: &ApiConfig, log_file: impl Into<PathBuf>) -> Self {
        let state = AppState {
            reader: LogReader::new(log_file),
        };
        Self {
            router: Self::build_router(config, state),
            shutdown_timeout: config.shutdown_timeout(),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ApiConfig, state: AppState) -> Router {
        Router::new()
            .route(
                CONNECTION_DATA_PATH,
                get(handlers::connection_data).options(handlers::preflight),
            )
            .with_state(state)
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET, OPTIONS"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("Content-Type"),
            ))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                config.request_timeout(),
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Bind the configured address.
    pub async fn bind(config: &ApiConfig) -> Result<TcpListener, ServeError> {
        let address = config.bind_address();
        TcpListener::bind(&address)
            .await
            .map_err(|source| ServeError::Bind { address, source })
    }

    /// Serve until `shutdown` fires, then drain within the shutdown deadline.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServeError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            path = CONNECTION_DATA_PATH,
            "API server starting"
        );

        let (draining_tx, draining_rx) = oneshot::channel::<()>();
        let serve = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                let _ = draining_tx.send(());
            })
            .into_future();
        tokio::pin!(serve);

        tokio::select! {
            result = &mut serve => {
                result?;
                tracing::info!("API server stopped");
                return Ok(());
            }
            _ = draining_rx => {}
        }

        tracing::info!(
            timeout_secs = self.shutdown_timeout.as_secs(),
            "API server draining in-flight requests"
        );
        match tokio::time::timeout(self.shutdown_timeout, &mut serve).await {
            Ok(result) => {
                result?;
                tracing::info!("API server stopped");
                Ok(())
            }
            Err(_) => {
                tracing::error!(
                    timeout_secs = self.shutdown_timeout.as_secs(),
                    "API server shutdown deadline exceeded, abandoning open connections"
                );
                Err(ServeError::ShutdownTimeout(self.shutdown_timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::HEADER;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    fn server_for(path: PathBuf) -> ApiServer {
        ApiServer::new(&ApiConfig::default(), path)
    }

    async fn send(server: &ApiServer, method: Method) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(CONNECTION_DATA_PATH)
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    #[tokio::test]
    async fn test_header_only_log_is_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, HEADER).unwrap();

        let (status, headers, body) = send(&server_for(path), Method::GET).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(body, b"[]");
    }

    #[tokio::test]
    async fn test_rows_become_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(
            &path,
            format!("{}2024-03-01T12:00:00Z,UP,9,0s,0s,1,\"ok\"\n", HEADER),
        )
        .unwrap();

        let (status, _, body) = send(&server_for(path), Method::GET).await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{
                "timestamp": "2024-03-01T12:00:00Z",
                "status": "UP",
                "latency": "9",
                "uptime": "0s",
                "downtime": "0s",
                "total_changes": "1",
                "message": "ok",
            }])
        );
    }

    #[tokio::test]
    async fn test_missing_log_is_500_with_cors() {
        let dir = tempfile::tempdir().unwrap();
        let (status, headers, body) = send(&server_for(dir.path().join("absent.csv")), Method::GET).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, b"Unable to read log file");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_undecodable_row_is_500_with_cors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let mut content = HEADER.as_bytes().to_vec();
        content.extend_from_slice(b"2024-03-01T12:00:00Z,UP,9,0s,0s,1,\"ok \xff\xfe\"\n");
        std::fs::write(&path, content).unwrap();

        let (status, headers, body) = send(&server_for(path), Method::GET).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, b"Error parsing CSV data");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
    }

    #[tokio::test]
    async fn test_preflight() {
        let dir = tempfile::tempdir().unwrap();
        let (status, headers, body) = send(&server_for(dir.path().join("absent.csv")), Method::OPTIONS).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
        assert!(headers.contains_key(crate::http::X_REQUEST_ID));
    }

    #[tokio::test]
    async fn test_other_methods_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (status, _, _) = send(&server_for(dir.path().join("absent.csv")), Method::POST).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
