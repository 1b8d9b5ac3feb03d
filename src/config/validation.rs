//! Configuration validation.
//!
//! Returns every problem found, not just the first. Runs before the config is
//! accepted; an empty command line is the one error that stops startup in
//! practice.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::WatchdogConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no function command configured (set `fprocess`)")]
    EmptyCommand,

    #[error("invalid bind address `{0}`")]
    BindAddress(String),

    #[error("invalid metrics address `{0}`")]
    MetricsAddress(String),
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &WatchdogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.function.command.trim().is_empty() {
        errors.push(ValidationError::EmptyCommand);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_command(command: &str) -> WatchdogConfig {
        let mut config = WatchdogConfig::default();
        config.function.command = command.to_string();
        config
    }

    #[test]
    fn accepts_minimal_config() {
        assert!(validate_config(&with_command("cat")).is_ok());
    }

    #[test]
    fn rejects_blank_command() {
        let errors = validate_config(&with_command("   ")).unwrap_err();
        assert_eq!(errors, vec![ValidationError::EmptyCommand]);
    }

    #[test]
    fn reports_all_errors() {
        let mut config = with_command("");
        config.listener.bind_address = "nope".into();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "also nope".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn ignores_metrics_address_when_disabled() {
        let mut config = with_command("cat");
        config.observability.metrics_address = "garbage".into();
        assert!(validate_config(&config).is_ok());
    }
}
