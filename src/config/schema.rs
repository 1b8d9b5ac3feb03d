//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the watchdog.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the watchdog.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WatchdogConfig {
    /// The function process invoked for every request.
    pub function: FunctionConfig,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// HTTP read/write deadlines.
    pub timeouts: TimeoutConfig,

    /// Diagnostic flags.
    pub debug: DebugConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl WatchdogConfig {
    /// Deadline for reading a request body, `None` when unbounded.
    pub fn read_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.timeouts.read_secs)
    }

    /// Deadline for producing a response, `None` when unbounded.
    pub fn write_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.timeouts.write_secs)
    }

    /// Deadline after which a running process is killed, `None` when unbounded.
    pub fn exec_timeout(&self) -> Option<Duration> {
        self.function.exec_timeout()
    }
}

/// The process to run per request.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FunctionConfig {
    /// Command line, split on whitespace into program and arguments.
    pub command: String,

    /// Kill the process after this many seconds (0 = never).
    pub exec_timeout_secs: u64,

    /// Maximum number of processes running at once (0 = unbounded).
    pub max_inflight: usize,
}

impl FunctionConfig {
    pub fn exec_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.exec_timeout_secs)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration. Zero means no timeout.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed to read the request body, in seconds.
    pub read_secs: u64,

    /// Time allowed to produce the response, in seconds.
    pub write_secs: u64,
}

/// Debug switches. Neither affects the response itself.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    /// Log inbound and outbound header sets.
    pub headers: bool,

    /// Log process output and failures.
    pub write: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unbounded() {
        let config = WatchdogConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.read_timeout().is_none());
        assert!(config.write_timeout().is_none());
        assert!(config.exec_timeout().is_none());
        assert_eq!(config.function.max_inflight, 0);
        assert!(!config.debug.headers);
        assert!(!config.debug.write);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: WatchdogConfig = toml::from_str(
            r#"
            [function]
            command = "cat"

            [timeouts]
            read_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.function.command, "cat");
        assert_eq!(config.read_timeout(), Some(Duration::from_secs(5)));
        assert!(config.write_timeout().is_none());
        assert_eq!(config.observability.log_level, "info");
    }
}
