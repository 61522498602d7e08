//! Controller capability and its stub implementation.

use std::time::Instant;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::request::X_REQUEST_ID;

/// Per-request data handed to a controller alongside the request itself.
///
/// Cancellation is carried by the future: when the client goes away or the
/// server force-closes the connection, the `download` future is dropped.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Value of the `x-request-id` header.
    pub request_id: String,
    /// When the router received the request.
    pub received_at: Instant,
}

impl RequestContext {
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let request_id = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        Self {
            request_id,
            received_at: Instant::now(),
        }
    }
}

/// Business-logic capabilities reachable from the HTTP routes.
#[async_trait]
pub trait Controller: Send + Sync + 'static {
    /// Serve a single file download.
    async fn download(&self, ctx: RequestContext, request: Request<Body>) -> Response;
}

/// Placeholder controller: answers every download with a fixed body.
#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadController;

impl DownloadController {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Controller for DownloadController {
    async fn download(&self, ctx: RequestContext, request: Request<Body>) -> Response {
        tracing::debug!(
            request_id = %ctx.request_id,
            path = %request.uri().path(),
            "Download requested"
        );

        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            "download",
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_returns_fixed_body() {
        let request = Request::post("/files/download")
            .header(X_REQUEST_ID, "abc")
            .body(Body::empty())
            .unwrap();
        let ctx = RequestContext::from_request(&request);
        assert_eq!(ctx.request_id, "abc");

        let response = DownloadController::new().download(ctx, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"download");
    }

    #[test]
    fn missing_request_id_falls_back() {
        let request = Request::post("/").body(Body::empty()).unwrap();
        assert_eq!(RequestContext::from_request(&request).request_id, "unknown");
    }
}
