//! `GET /health` endpoint handler.
//!
//! Returns a [`HealthResponse`] JSON payload with the server version,
//! uptime, the backend the forwarder points at, and cumulative
//! forwarding statistics.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub backend: BackendHealth,
    pub stats: StatsResponse,
}

#[derive(Serialize, Deserialize)]
pub struct BackendHealth {
    pub origin: String,
    pub environment: String,
    pub timeout_ms: u64,
}

#[derive(Serialize, Deserialize)]
pub struct StatsResponse {
    pub requests_forwarded: u64,
    pub requests_failed: u64,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let config = state.forwarder.config();
    let stats = state.forwarder.stats();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        backend: BackendHealth {
            origin: config.backend_origin().to_string(),
            environment: config.environment().to_string(),
            timeout_ms: u64::try_from(config.timeout().as_millis()).unwrap_or(u64::MAX),
        },
        stats: StatsResponse {
            requests_forwarded: stats.forwarded.load(Ordering::Relaxed),
            requests_failed: stats.failed.load(Ordering::Relaxed),
        },
    })
}
