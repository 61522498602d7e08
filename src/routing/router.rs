//! Route table and handlers.
//!
//! # Responsibilities
//! - Bind `POST /files/download` to `Controller::download`
//! - Reserve `POST /files/batch/download` (no behaviour yet)
//! - Wire up middleware (request ID, tracing, write timeout)
//!
//! # Design Decisions
//! - Immutable after construction (cloned per connection without locks)
//! - Handlers own no logic; they forward to the controller unchanged

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::post,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::api::{Controller, RequestContext};
use crate::config::ServerConfig;
use crate::http::request::{UuidRequestId, X_REQUEST_ID};

/// Path of the single-file download route.
pub const DOWNLOAD_PATH: &str = "/files/download";

/// Path reserved for batched downloads.
pub const BATCH_DOWNLOAD_PATH: &str = "/files/batch/download";

/// Build the application router around `controller`.
#[allow(deprecated)]
pub fn build_router(controller: Arc<dyn Controller>, config: &ServerConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(TimeoutLayer::new(config.write_timeout()));

    Router::new()
        .route(DOWNLOAD_PATH, post(download))
        .route(BATCH_DOWNLOAD_PATH, post(batch_download))
        .with_state(controller)
        .layer(middleware)
}

async fn download(
    State(controller): State<Arc<dyn Controller>>,
    request: Request<Body>,
) -> Response {
    let ctx = RequestContext::from_request(&request);
    controller.download(ctx, request).await
}

/// Placeholder for batched downloads; answers with the framework default.
async fn batch_download() {}
