//! Expose an executable as an HTTP endpoint.
//!
//! Every POST spawns a fresh process, streams the request body to its stdin
//! and answers with its combined stdout/stderr.

pub mod config;
pub mod exec;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::WatchdogConfig;
pub use exec::{CommandLine, ExecutionError, Executor};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
