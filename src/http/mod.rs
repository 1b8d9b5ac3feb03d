//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, span, body read under deadline)
//!     → handler.rs (method check, executor call)
//!     → response.rs (status, body, Content-Type rule)
//!     → Send to client
//! ```

pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use handler::AppState;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
