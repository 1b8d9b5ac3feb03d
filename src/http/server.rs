//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the single invocation handler
//! - Wire up middleware (write deadline, tracing, request ID)
//! - Bind server to listener and serve until shutdown

use std::sync::Arc;

use axum::{routing::any, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::SetRequestIdLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::WatchdogConfig;
use crate::exec::{CommandLineError, Executor};
use crate::http::handler::{invoke, AppState};
use crate::http::request::{make_span, UuidRequestId};

/// HTTP front end for the function process.
pub struct HttpServer {
    router: Router,
    config: Arc<WatchdogConfig>,
    executor: Arc<Executor>,
}

impl HttpServer {
    /// Build the server. Fails only if the command line is empty.
    pub fn new(config: WatchdogConfig) -> Result<Self, CommandLineError> {
        let executor = Arc::new(Executor::from_config(&config.function)?);
        let config = Arc::new(config);

        let state = AppState {
            executor: executor.clone(),
            config: config.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            executor,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &WatchdogConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/", any(invoke))
            .route("/{*path}", any(invoke))
            .with_state(state);

        let router = match config.write_timeout() {
            Some(limit) => router.layer(TimeoutLayer::new(limit)),
            None => router,
        };

        router
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// A clone of the fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &WatchdogConfig {
        &self.config
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight requests.
    ///
    /// Requests still queued for a process slot at that point get a 500.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            command = %self.executor.command(),
            read_timeout = ?self.config.read_timeout(),
            write_timeout = ?self.config.write_timeout(),
            exec_timeout = ?self.config.exec_timeout(),
            max_inflight = self.executor.max_inflight(),
            "HTTP server starting"
        );

        let executor = self.executor.clone();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
                executor.close();
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
