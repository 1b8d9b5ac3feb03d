//! Startup orchestration.
//!
//! Order: build the server (fails on an empty command line), start the
//! metrics exporter if enabled, bind the listener, then serve. Any startup
//! error is fatal.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::WatchdogConfig;
use crate::exec::CommandLineError;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid function command: {0}")]
    Command(#[from] CommandLineError),

    #[error("invalid metrics address `{0}`")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Run the watchdog until `shutdown` is triggered.
pub async fn run(config: WatchdogConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    let bind_address = config.listener.bind_address.clone();
    let observability = config.observability.clone();

    let server = HttpServer::new(config)?;

    if observability.metrics_enabled {
        let addr: SocketAddr = observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: bind_address.clone(),
            source,
        })?;

    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
