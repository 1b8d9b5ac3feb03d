//! The function invocation handler.
//!
//! POST pipes the body through the process; every other method is 405 and
//! never touches the executor.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    response::Response,
};

use crate::config::WatchdogConfig;
use crate::exec::Executor;
use crate::http::request::{read_body, BodyError};
use crate::http::response::{self, Direction};
use crate::observability::metrics::{InvocationTimer, Outcome};

/// Read-only state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<Executor>,
    pub config: Arc<WatchdogConfig>,
}

pub async fn invoke(State(state): State<AppState>, request: Request<Body>) -> Response {
    // Dropped unfinished only when something outside cuts the handler off.
    let unfinished = match state.config.write_timeout() {
        Some(_) => Outcome::Timeout,
        None => Outcome::Cancelled,
    };
    let timer = InvocationTimer::start(unfinished);

    if request.method() != Method::POST {
        timer.finish(Outcome::MethodNotAllowed);
        return response::empty(StatusCode::METHOD_NOT_ALLOWED);
    }

    let debug = &state.config.debug;
    let (parts, body) = request.into_parts();

    if debug.headers {
        response::dump_headers(&parts.headers, Direction::In);
    }

    let input = match read_body(body, state.config.read_timeout()).await {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!(error = %e, "Request body not read");
            let (outcome, status) = match e {
                BodyError::Timeout(_) => (Outcome::Timeout, StatusCode::REQUEST_TIMEOUT),
                BodyError::Read(_) => (Outcome::Failure, StatusCode::BAD_REQUEST),
            };
            timer.finish(outcome);
            return response::empty(status);
        }
    };

    let (response, outcome) = match state.executor.execute(&input).await {
        Ok(output) => {
            if debug.write {
                tracing::info!(
                    command = %state.executor.command(),
                    output = %String::from_utf8_lossy(&output),
                    "Function output"
                );
            }
            let response = response::output(output, response::has_content_type(&parts.headers));
            (response, Outcome::Success)
        }
        Err(e) => {
            if debug.write {
                tracing::error!(command = %state.executor.command(), error = %e, "Function failed");
            } else {
                tracing::debug!(error = %e, "Function failed");
            }
            (response::failure(&e), Outcome::Failure)
        }
    };

    if debug.headers {
        response::dump_headers(response.headers(), Direction::Out);
    }

    timer.finish(outcome);
    response
}
