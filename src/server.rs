//! Axum server setup, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared state holding the forwarder
//! and uptime), [`build_router`] for the host router with the forwarding
//! layer in front, [`build_http_client`] for the connection-pooled hyper
//! client, and [`shutdown_signal`] for SIGTERM / Ctrl+C handling.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::health::health_handler;
use crate::middleware::api_forwarding;
use crate::proxy::Forwarder;

pub type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;
pub type HttpClient = Client<HttpsConnector, http_body_util::Full<bytes::Bytes>>;

pub struct AppState {
    pub forwarder: Forwarder,
    pub start_time: Instant,
}

impl AppState {
    #[must_use]
    pub fn new(forwarder: Forwarder) -> Self {
        Self {
            forwarder,
            start_time: Instant::now(),
        }
    }
}

#[must_use]
pub fn build_http_client() -> HttpClient {
    // Several rustls crypto providers may be compiled in; pin `ring`.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(30))
        .build(https)
}

/// Host router: `/health` plus a 404 fallback, with API forwarding in front.
///
/// The body limit only wraps the inner routes. API requests enforce
/// `max_body` inside the forwarder so rejections still carry a
/// correlation ID and a log entry, and GET/HEAD bodies are never read.
pub fn build_router(state: Arc<AppState>) -> Router {
    let max_body = state.forwarder.config().max_body();
    Router::new()
        .route("/health", get(health_handler))
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state),
            api_forwarding,
        ))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    StatusCode::NOT_FOUND
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
