//! Keep-alive HTTP endpoint for hosts that expect the process to answer pings.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

pub const ALIVE: &str = "Bot is alive";

#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/", get(|| async { ALIVE }))
        .layer(TraceLayer::new_for_http())
}

/// Serve the keep-alive endpoint on all interfaces.
///
/// # Errors
///
/// Returns an error if the port cannot be bound or the server fails.
pub async fn serve(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!(addr = %addr, "Starting keep-alive server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind keep-alive server")?;

    axum::serve(listener, router())
        .await
        .context("Keep-alive server error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_root_answers() {
        let response = router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], ALIVE.as_bytes());
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let response = router()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
