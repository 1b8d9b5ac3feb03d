//! Metrics collection and exposition.
//!
//! # Metrics
//! - `watchdog_invocations_total` (counter): requests by outcome
//! - `watchdog_invocation_duration_seconds` (histogram): time spent per request
//! - `watchdog_inflight_processes` (gauge): processes currently running
//!
//! Recording goes through the `metrics` facade and is a no-op until an
//! exporter is installed with [`init_metrics`].

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const INVOCATIONS_TOTAL: &str = "watchdog_invocations_total";
pub const INVOCATION_DURATION: &str = "watchdog_invocation_duration_seconds";
pub const INFLIGHT_PROCESSES: &str = "watchdog_inflight_processes";

/// How a request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    MethodNotAllowed,
    Timeout,
    /// The handler was dropped before it answered.
    Cancelled,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::MethodNotAllowed => "method_not_allowed",
            Outcome::Timeout => "timeout",
            Outcome::Cancelled => "cancelled",
        }
    }
}

/// Install the Prometheus exporter with its own HTTP listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one finished request.
pub fn record_invocation(outcome: Outcome, started: Instant) {
    metrics::counter!(INVOCATIONS_TOTAL, "outcome" => outcome.as_str()).increment(1);
    metrics::histogram!(INVOCATION_DURATION, "outcome" => outcome.as_str())
        .record(started.elapsed().as_secs_f64());
}

/// Records one request when dropped.
///
/// If the handler future is dropped before [`finish`](Self::finish) runs, as
/// when the write deadline cuts it off, the request is recorded with the
/// outcome passed to [`start`](Self::start).
#[derive(Debug)]
pub struct InvocationTimer {
    started: Instant,
    outcome: Outcome,
}

impl InvocationTimer {
    pub fn start(unfinished: Outcome) -> Self {
        Self {
            started: Instant::now(),
            outcome: unfinished,
        }
    }

    pub fn finish(mut self, outcome: Outcome) {
        self.outcome = outcome;
    }
}

impl Drop for InvocationTimer {
    fn drop(&mut self) {
        record_invocation(self.outcome, self.started);
    }
}

/// Count a running process until the guard is dropped.
pub fn track_inflight() -> InflightGuard {
    metrics::gauge!(INFLIGHT_PROCESSES).increment(1.0);
    InflightGuard { _private: () }
}

/// Decrements the in-flight gauge on drop, including on cancellation.
#[derive(Debug)]
pub struct InflightGuard {
    _private: (),
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        metrics::gauge!(INFLIGHT_PROCESSES).decrement(1.0);
    }
}
