//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api_gateway::config::{GatewayConfig, RouteConfig};
use api_gateway::{GatewayServer, Shutdown};
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use axum::Router;
use tokio::net::TcpListener;

/// What a mock backend saw for one request.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A running mock upstream.
pub struct MockBackend {
    pub addr: SocketAddr,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> CapturedRequest {
        self.requests().pop().expect("backend received no request")
    }
}

/// Start a backend answering every request with `status` and `body`.
pub async fn start_backend(status: u16, body: &'static str) -> MockBackend {
    start_slow_backend(status, body, Duration::ZERO).await
}

/// Start a backend that waits `delay` before answering.
pub async fn start_slow_backend(status: u16, body: &'static str, delay: Duration) -> MockBackend {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();

    let app = Router::new().fallback(move |request: Request<Body>| {
        let sink = sink.clone();
        async move {
            let (parts, incoming) = request.into_parts();
            let body_bytes = axum::body::to_bytes(incoming, usize::MAX)
                .await
                .unwrap_or_default();
            sink.lock().unwrap().push(CapturedRequest {
                method: parts.method,
                uri: parts.uri,
                headers: parts.headers,
                body: body_bytes,
            });

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            (
                StatusCode::from_u16(status).unwrap(),
                [("x-backend-header", "kept")],
                body,
            )
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockBackend { addr, captured }
}

/// Start a backend that sends a response head promising `content-length`
/// bytes, writes only part of the body, then goes silent for `stall`.
pub async fn start_stalling_backend(stall: Duration) -> SocketAddr {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 10\r\n\r\nabc")
                    .await;
                let _ = socket.flush().await;
                tokio::time::sleep(stall).await;
            });
        }
    });
    addr
}

/// An address nothing is listening on.
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Config with the given routes and admission control disabled.
pub fn gateway_config(routes: &[(&str, String)]) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.admission.enabled = false;
    config.routes = routes
        .iter()
        .map(|(prefix, upstream)| RouteConfig::new(*prefix, upstream.clone()))
        .collect();
    config
}

/// A running gateway under test.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_gateway(config: GatewayConfig) -> TestGateway {
    serve(GatewayServer::new(config).unwrap()).await
}

pub async fn serve(server: GatewayServer) -> TestGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    TestGateway { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
