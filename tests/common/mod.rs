//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use tokio::net::TcpListener;

use chain_subconverter::{HttpServer, ServiceConfig, Shutdown};

/// Subscription with one landing node per region and matching fronts.
pub const SUBSCRIPTION: &str = "\
port: 7890
mode: rule
proxies:
  - {name: US-Landing, type: ss, server: us.example.com, port: 443}
  - {name: HK-Landing, type: ss, server: hk.example.com, port: 443}
  - {name: US-01, type: ss, server: 10.0.0.1, port: 443}
  - {name: HK-01, type: ss, server: 10.0.0.2, port: 443}
proxy-groups:
  - {name: US-Group, type: select, proxies: [US-01, US-Landing]}
  - {name: Proxy, type: select, proxies: [US-Landing, HK-Landing, US-Group]}
rules:
  - MATCH,Proxy
";

/// Start an upstream serving subscription documents and failure cases.
///
/// Routes: `/sub.yaml`, `/bom.yaml`, `/not-a-map.yaml`, `/empty.yaml`,
/// `/missing` (404), `/error` (500), `/slow` (sleeps 5s).
pub async fn start_upstream() -> SocketAddr {
    let app = Router::new()
        .route("/sub.yaml", get(|| async { SUBSCRIPTION }))
        .route(
            "/bom.yaml",
            get(|| async {
                let mut body = vec![0xEF, 0xBB, 0xBF];
                body.extend_from_slice(SUBSCRIPTION.as_bytes());
                body
            }),
        )
        .route("/not-a-map.yaml", get(|| async { "- just\n- a list\n" }))
        .route("/empty.yaml", get(|| async { "proxies: []\n" }))
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "gone") }))
        .route("/error", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                SUBSCRIPTION
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Config suitable for tests: ephemeral port, no frontend, short fetch timeout.
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.static_files.enabled = false;
    config.fetch.timeout_secs = 1;
    config
}

/// Running service under test. Dropping it stops the server.
pub struct TestService {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the converter on an ephemeral port.
pub async fn start_service(config: ServiceConfig) -> TestService {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let server = HttpServer::new(config).unwrap();
    tokio::spawn(async move {
        server.run(listener, receiver).await.unwrap();
    });
    TestService { addr, shutdown }
}
