//! Response construction for function invocations.
//!
//! # Design Decisions
//! - Success bodies are the raw process output; no content sniffing
//! - `Content-Type: application/json` is forced whenever the caller sent a
//!   `Content-Type`, and left unset otherwise
//! - Failures are 500 with the error text as a plain-text body

use std::fmt;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, StatusCode},
    response::Response,
};

use crate::exec::ExecutionError;

/// Which side of the exchange a header dump describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => f.write_str("in"),
            Direction::Out => f.write_str("out"),
        }
    }
}

/// Log every header, one event each.
pub fn dump_headers(headers: &HeaderMap, direction: Direction) {
    for (name, value) in headers {
        tracing::info!(%direction, "[{}] {}={:?}", direction, name, value);
    }
}

/// Did the caller send a non-empty `Content-Type`?
pub fn has_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .is_some_and(|v| !v.as_bytes().is_empty())
}

/// 200 carrying the process output.
pub fn output(body: Vec<u8>, json: bool) -> Response {
    let mut response = Response::new(Body::from(body));
    if json {
        response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    response
}

/// 500 carrying the error text.
pub fn failure(err: &ExecutionError) -> Response {
    let mut response = Response::new(Body::from(err.to_string()));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// Bare status, empty body, no headers.
pub fn empty(status: StatusCode) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_presence() {
        let mut headers = HeaderMap::new();
        assert!(!has_content_type(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert!(has_content_type(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static(""));
        assert!(!has_content_type(&headers));
    }

    #[test]
    fn output_sets_json_only_when_asked() {
        let plain = output(b"x".to_vec(), false);
        assert_eq!(plain.status(), StatusCode::OK);
        assert!(plain.headers().get(CONTENT_TYPE).is_none());

        let json = output(b"x".to_vec(), true);
        assert_eq!(json.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn empty_has_no_headers() {
        let response = empty(StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.headers().is_empty());
    }

    #[test]
    fn direction_labels() {
        assert_eq!(Direction::In.to_string(), "in");
        assert_eq!(Direction::Out.to_string(), "out");
    }
}
