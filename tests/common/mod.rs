//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use watchdog::{HttpServer, Shutdown, WatchdogConfig};

/// A watchdog serving on an ephemeral local port.
pub struct TestWatchdog {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestWatchdog {
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }
}

impl Drop for TestWatchdog {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Config that runs `command` with everything else at defaults.
pub fn config_for(command: &str) -> WatchdogConfig {
    let mut config = WatchdogConfig::default();
    config.function.command = command.to_string();
    config
}

/// Start a watchdog for `config` and wait until it accepts connections.
pub async fn start_watchdog(config: WatchdogConfig) -> TestWatchdog {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    for _ in 0..50 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    TestWatchdog { addr, shutdown }
}

/// Client that never reuses connections between tests.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
