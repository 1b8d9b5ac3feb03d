//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → optional config file (TOML) via loader.rs
//!     → environment overlay (fprocess, read_timeout, ...)
//!     → validation.rs (semantic checks)
//!     → WatchdogConfig (validated, immutable)
//!     → shared via Arc with every request handler
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{
    load_config, load_config_with_rejections, ConfigError, Environment, OsEnvironment,
    RejectedValue,
};
pub use schema::{
    DebugConfig, FunctionConfig, ListenerConfig, ObservabilityConfig, TimeoutConfig,
    WatchdogConfig,
};
pub use validation::{validate_config, ValidationError};
