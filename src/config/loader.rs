//! Configuration loading from disk and the process environment.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::num::ParseIntError;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::WatchdogConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the function command line.
pub const ENV_FPROCESS: &str = "fprocess";
pub const ENV_READ_TIMEOUT: &str = "read_timeout";
pub const ENV_WRITE_TIMEOUT: &str = "write_timeout";
pub const ENV_WRITE_DEBUG: &str = "write_debug";
pub const ENV_DEBUG_HEADERS: &str = "debug_headers";
pub const ENV_EXEC_TIMEOUT: &str = "exec_timeout";
pub const ENV_MAX_INFLIGHT: &str = "max_inflight";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// An environment value that could not be parsed and was replaced by 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedValue {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

impl fmt::Display for RejectedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}: {}", self.key, self.value, self.reason)
    }
}

impl RejectedValue {
    /// Emit the rejection as a warning on the current subscriber.
    pub fn log(&self) {
        tracing::warn!(
            key = self.key,
            value = %self.value,
            error = %self.reason,
            "Ignoring invalid value, using 0"
        );
    }
}

/// Source of environment variables.
pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads from the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEnvironment;

impl Environment for OsEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Load, overlay and validate configuration.
///
/// Defaults are overridden by the optional TOML file, which is in turn
/// overridden by any environment variable that is set. Rejected environment
/// values are logged right away; callers that load before installing a
/// subscriber should use [`load_config_with_rejections`] instead.
pub fn load_config<E: Environment>(
    path: Option<&Path>,
    env: &E,
) -> Result<WatchdogConfig, ConfigError> {
    let (config, rejected) = load_config_with_rejections(path, env)?;
    rejected.iter().for_each(RejectedValue::log);
    Ok(config)
}

/// Like [`load_config`], but hands back rejected environment values instead
/// of logging them.
pub fn load_config_with_rejections<E: Environment>(
    path: Option<&Path>,
    env: &E,
) -> Result<(WatchdogConfig, Vec<RejectedValue>), ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => WatchdogConfig::default(),
    };

    let rejected = apply_env(&mut config, env);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok((config, rejected))
}

/// Overlay environment variables onto `config`.
///
/// Returns the numeric values that did not parse; each was set to 0.
pub fn apply_env<E: Environment>(config: &mut WatchdogConfig, env: &E) -> Vec<RejectedValue> {
    let mut rejected = Vec::new();

    if let Some(command) = env.var(ENV_FPROCESS) {
        config.function.command = command;
    }
    if let Some(secs) = count_var(env, ENV_READ_TIMEOUT, &mut rejected) {
        config.timeouts.read_secs = secs;
    }
    if let Some(secs) = count_var(env, ENV_WRITE_TIMEOUT, &mut rejected) {
        config.timeouts.write_secs = secs;
    }
    if let Some(secs) = count_var(env, ENV_EXEC_TIMEOUT, &mut rejected) {
        config.function.exec_timeout_secs = secs;
    }
    if let Some(max) = count_var(env, ENV_MAX_INFLIGHT, &mut rejected) {
        config.function.max_inflight = max as usize;
    }
    if let Some(raw) = env.var(ENV_WRITE_DEBUG) {
        config.debug.write = parse_flag(&raw);
    }
    if let Some(raw) = env.var(ENV_DEBUG_HEADERS) {
        config.debug.headers = parse_flag(&raw);
    }

    rejected
}

/// Read `key` as a count, recording it in `rejected` if it does not parse.
fn count_var<E: Environment>(
    env: &E,
    key: &'static str,
    rejected: &mut Vec<RejectedValue>,
) -> Option<u64> {
    let raw = env.var(key)?;
    let count = parse_count(&raw).unwrap_or_else(|e| {
        rejected.push(RejectedValue {
            key,
            value: raw.trim().to_string(),
            reason: e.to_string(),
        });
        0
    });
    Some(count)
}

/// Non-negative integer; blank counts as zero.
fn parse_count(raw: &str) -> Result<u64, ParseIntError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse()
}

/// Only the literal `true` switches a flag on.
fn parse_flag(raw: &str) -> bool {
    raw == "true"
}
