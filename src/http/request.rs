//! Inbound request helpers.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) as early as possible
//! - Open the per-request tracing span carrying that ID
//! - Read the body under the configured read deadline

use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request},
};
use thiserror::Error;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID generator for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Span factory for `TraceLayer`.
pub fn make_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("request body not received within {0:?}")]
    Timeout(Duration),

    #[error("failed to read request body: {0}")]
    Read(#[from] axum::Error),
}

/// Buffer the whole body. There is no size cap; only `deadline` bounds it.
pub async fn read_body(body: Body, deadline: Option<Duration>) -> Result<Bytes, BodyError> {
    let read = axum::body::to_bytes(body, usize::MAX);
    match deadline {
        Some(limit) => tokio::time::timeout(limit, read)
            .await
            .map_err(|_| BodyError::Timeout(limit))?
            .map_err(BodyError::Read),
        None => read.await.map_err(BodyError::Read),
    }
}
