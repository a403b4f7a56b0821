//! Shared helpers for integration tests: mock backends and a forwarder
//! wired to an in-memory log sink.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use tailspin_forwarder::config::ForwarderConfig;
use tailspin_forwarder::proxy::Forwarder;
use tailspin_forwarder::request_log::MemorySink;
use tailspin_forwarder::server::{self, AppState};

pub struct TestForwarder {
    pub addr: SocketAddr,
    pub state: Arc<AppState>,
    pub sink: Arc<MemorySink>,
    shutdown: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestForwarder {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestForwarder {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub fn test_config(origin: &str) -> ForwarderConfig {
    ForwarderConfig::new(origin)
        .unwrap()
        .with_environment("test")
        .with_timeout(Duration::from_secs(5))
}

pub fn forwarder_for(origin: &str, timeout: Duration) -> (Forwarder, Arc<MemorySink>) {
    forwarder_with(test_config(origin).with_timeout(timeout))
}

fn forwarder_with(config: ForwarderConfig) -> (Forwarder, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let forwarder = Forwarder::new(config, server::build_http_client(), sink.clone());
    (forwarder, sink)
}

pub async fn start_forwarder(origin: &str) -> TestForwarder {
    start_forwarder_with_config(test_config(origin)).await
}

pub async fn start_forwarder_with_timeout(origin: &str, timeout: Duration) -> TestForwarder {
    start_forwarder_with_config(test_config(origin).with_timeout(timeout)).await
}

pub async fn start_forwarder_with_config(config: ForwarderConfig) -> TestForwarder {
    let (forwarder, sink) = forwarder_with(config);
    let state = Arc::new(AppState::new(forwarder));
    let router = server::build_router(Arc::clone(&state));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    TestForwarder {
        addr,
        state,
        sink,
        shutdown: Some(shutdown_tx),
    }
}

/// Serve `router` on an ephemeral port; returns its origin (`http://127.0.0.1:N`).
pub async fn start_backend(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Backend that answers every connection with a fixed raw HTTP/1.1 response.
pub async fn start_raw_backend(response: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = read_head(&mut socket).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

/// An origin nothing is listening on.
pub async fn refused_origin() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Send a raw request and return everything the server wrote back.
pub async fn raw_request(addr: SocketAddr, request: &str) -> String {
    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut buf = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buf))
        .await
        .unwrap()
        .unwrap();
    String::from_utf8_lossy(&buf).into_owned()
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Ok(())
}
