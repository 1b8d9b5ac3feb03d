//! watchdog
//!
//! Turns any executable into an HTTP service, one process per request.
//!
//! # Architecture Overview
//!
//! ```text
//!   POST /  ──▶ http::handler ──▶ exec::Executor ──spawn──▶ fprocess
//!                    │                  │  stdin ◀── body
//!                    │                  │  stdout+stderr ──▶ buffer
//!   200/500 ◀────────┘◀─────────────────┘  join
//! ```
//!
//! Configuration comes from an optional TOML file overlaid with the
//! environment (`fprocess`, `read_timeout`, `write_timeout`, `write_debug`,
//! `debug_headers`, `exec_timeout`, `max_inflight`).

use std::path::PathBuf;

use clap::Parser;

use watchdog::config::{load_config_with_rejections, OsEnvironment};
use watchdog::lifecycle::{startup, Shutdown};
use watchdog::observability::logging;

#[derive(Parser)]
#[command(name = "watchdog")]
#[command(about = "Serve an executable over HTTP, one process per request", long_about = None)]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (overrides the config file).
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The subscriber's level may come from the config file, so loading runs
    // first and its warnings are held until logging is up.
    let loaded = load_config_with_rejections(cli.config.as_deref(), &OsEnvironment);

    let level = cli
        .log_level
        .clone()
        .or_else(|| {
            loaded
                .as_ref()
                .ok()
                .map(|(c, _)| c.observability.log_level.clone())
        })
        .unwrap_or_else(|| "info".to_string());
    logging::init_logging(&level);

    let config = match loaded {
        Ok((config, rejected)) => {
            rejected.iter().for_each(|r| r.log());
            config
        }
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration, refusing to start");
            return Err(e.into());
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        "watchdog starting"
    );

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown.clone().trigger_on_signal());

    startup::run(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
