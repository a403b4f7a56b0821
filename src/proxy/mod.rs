//! Core API forwarding.
//!
//! [`Forwarder::forward`] takes an inbound request that targets the API
//! surface (see [`is_api_path`]) and relays it to the configured backend
//! origin. Backend responses of any status are relayed verbatim; only a
//! failure to complete the outbound call turns into a `502`. Submodules
//! handle header construction ([`headers`]) and the outbound call itself
//! ([`upstream`]).

pub mod headers;
pub mod upstream;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::config::ForwarderConfig;
use crate::correlation::{self, CorrelationId, Resolved};
use crate::error::{RelayError, TransportError};
use crate::request_log::{Level, LogEntry, LogSink};
use crate::server::HttpClient;

use upstream::{UpstreamRequest, UpstreamResponse};

const API_MARKER: &str = "/api/";

/// Whether a request path belongs to the API surface.
#[must_use]
pub fn is_api_path(path: &str) -> bool {
    path.contains(API_MARKER)
}

#[derive(Debug)]
pub struct Stats {
    pub forwarded: AtomicU64,
    pub failed: AtomicU64,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            forwarded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }
}

/// JSON body returned when the forwarder itself cannot complete a request.
#[derive(Debug, Serialize, Deserialize)]
pub struct FailureBody {
    pub error: String,
    pub correlation_id: String,
}

pub struct Forwarder {
    config: ForwarderConfig,
    client: HttpClient,
    sink: Arc<dyn LogSink>,
    stats: Stats,
}

impl Forwarder {
    #[must_use]
    pub fn new(config: ForwarderConfig, client: HttpClient, sink: Arc<dyn LogSink>) -> Self {
        Self {
            config,
            client,
            sink,
            stats: Stats::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ForwarderConfig {
        &self.config
    }

    #[must_use]
    pub const fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Relay `request` to the backend and translate the outcome.
    ///
    /// Does not look at the path; callers decide whether the request
    /// belongs to the API surface.
    pub async fn forward(&self, request: Request) -> Response {
        let start = Instant::now();
        let (parts, body) = request.into_parts();
        let method = parts.method.clone();
        let api_path = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path(), |pq| pq.as_str())
            .to_string();

        let resolved = correlation::resolve(&parts.headers);
        if let Resolved::Replaced(ref id) = resolved {
            self.emit(
                LogEntry::new(
                    Level::Warn,
                    "Ignoring unusable X-Correlation-ID header, generated a new one",
                    id,
                    self.config.environment(),
                )
                .request(method.as_str(), &api_path),
            );
        }
        let correlation_id = resolved.into_id();

        let target_url = self.config.target_url(&api_path);
        self.emit(
            LogEntry::new(
                Level::Info,
                format!("Forwarding API request: {method} {api_path}"),
                &correlation_id,
                self.config.environment(),
            )
            .request(method.as_str(), &api_path)
            .target_url(&target_url),
        );

        let result = self
            .relay(&parts.method, &parts.headers, body, &target_url, &correlation_id)
            .await;
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(upstream) => {
                let status = upstream.parts.status;
                self.emit(
                    LogEntry::new(
                        Level::Info,
                        format!(
                            "API request completed: {method} {api_path} - {}",
                            status.as_u16()
                        ),
                        &correlation_id,
                        self.config.environment(),
                    )
                    .request(method.as_str(), &api_path)
                    .status_code(status.as_u16())
                    .duration_ms(duration_ms),
                );
                self.stats.forwarded.fetch_add(1, Ordering::Relaxed);
                relay_response(upstream, &correlation_id)
            }
            Err(err) => {
                self.emit(
                    LogEntry::new(
                        Level::Error,
                        format!("Failed to forward API request: {err}"),
                        &correlation_id,
                        self.config.environment(),
                    )
                    .request(method.as_str(), &api_path)
                    .error_type(err.kind())
                    .duration_ms(duration_ms),
                );
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                failure_response(&err, &correlation_id)
            }
        }
    }

    async fn relay(
        &self,
        method: &Method,
        inbound_headers: &axum::http::HeaderMap,
        body: Body,
        target_url: &str,
        correlation_id: &CorrelationId,
    ) -> Result<UpstreamResponse, RelayError> {
        let uri: Uri = target_url
            .parse()
            .map_err(|source| TransportError::InvalidTarget {
                uri: target_url.to_string(),
                source,
            })?;

        let with_body = carries_body(method);
        let body = if with_body {
            axum::body::to_bytes(body, self.config.max_body())
                .await
                .map_err(RelayError::RequestBody)?
        } else {
            Bytes::new()
        };

        let request = UpstreamRequest {
            method: method.clone(),
            headers: headers::outbound_headers(inbound_headers, &uri, correlation_id, with_body),
            uri,
            body,
        };

        Ok(upstream::send(&self.client, request, self.config.timeout()).await?)
    }

    fn emit(&self, entry: LogEntry) {
        self.sink.emit(entry);
    }
}

/// GET and HEAD never send a body upstream, whatever the caller attached.
#[must_use]
pub fn carries_body(method: &Method) -> bool {
    method != Method::GET && method != Method::HEAD
}

fn relay_response(upstream: UpstreamResponse, correlation_id: &CorrelationId) -> Response {
    let UpstreamResponse { parts, body } = upstream;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = parts.status;
    *response.headers_mut() = headers::relayed_headers(parts.headers, correlation_id);
    if let Some(reason) = parts.extensions.get::<hyper::ext::ReasonPhrase>() {
        response.extensions_mut().insert(reason.clone());
    }
    response
}

fn failure_response(err: &RelayError, correlation_id: &CorrelationId) -> Response {
    let status: StatusCode = err.status();
    let body = FailureBody {
        error: err.public_message().to_string(),
        correlation_id: correlation_id.as_str().to_string(),
    };

    let mut response = (status, Json(body)).into_response();
    if let Some(val) = correlation_id.header_value() {
        response.headers_mut().insert(correlation::HEADER, val);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_path_predicate() {
        assert!(is_api_path("/api/games"));
        assert!(is_api_path("/api/games/42"));
        assert!(is_api_path("/storefront/api/games"));
        assert!(!is_api_path("/api"));
        assert!(!is_api_path("/games"));
        assert!(!is_api_path("/apiary/"));
        assert!(!is_api_path("/"));
    }

    #[test]
    fn only_get_and_head_skip_the_body() {
        assert!(!carries_body(&Method::GET));
        assert!(!carries_body(&Method::HEAD));
        assert!(carries_body(&Method::POST));
        assert!(carries_body(&Method::PUT));
        assert!(carries_body(&Method::PATCH));
        assert!(carries_body(&Method::DELETE));
        assert!(carries_body(&Method::OPTIONS));
    }

    #[tokio::test]
    async fn transport_failure_body_is_fixed_json() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            correlation::HEADER,
            axum::http::HeaderValue::from_static("cid-502"),
        );
        let cid = correlation::resolve(&headers).into_id();
        let err = RelayError::from(TransportError::Timeout(std::time::Duration::from_secs(1)));

        let response = failure_response(&err, &cid);
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(response.headers()[correlation::HEADER], "cid-502");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "error": "Failed to reach API server",
                "correlation_id": "cid-502",
            })
        );
    }
}
