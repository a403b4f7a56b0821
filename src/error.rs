//! Error types for the forwarder.
//!
//! [`ForwarderError`] covers startup and CLI failures. [`TransportError`]
//! and [`RelayError`] describe what can go wrong while a single API
//! request is being relayed; both carry a short `kind()` label that ends
//! up in the `error_type` field of the terminal log entry.

use std::time::Duration;

use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ForwarderError {
    #[error("Invalid API server URL '{origin}': {reason}")]
    InvalidBackendOrigin { origin: String, reason: String },

    #[error("Invalid request timeout: must be greater than zero")]
    InvalidTimeout,

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(hyper::StatusCode),
}

/// The outbound call to the backend could not complete.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid target URI '{uri}': {source}")]
    InvalidTarget {
        uri: String,
        #[source]
        source: axum::http::uri::InvalidUri,
    },

    #[error("connection to API server failed: {0}")]
    Connect(#[source] hyper_util::client::legacy::Error),

    #[error("request to API server failed: {0}")]
    Request(#[source] hyper_util::client::legacy::Error),

    #[error("failed to read API server response body: {0}")]
    Body(#[source] hyper::Error),

    #[error("API server did not respond within {}ms", .0.as_millis())]
    Timeout(Duration),
}

impl TransportError {
    /// Splits client errors into connect failures and everything else.
    #[must_use]
    pub fn from_client(err: hyper_util::client::legacy::Error) -> Self {
        if err.is_connect() {
            Self::Connect(err)
        } else {
            Self::Request(err)
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidTarget { .. } => "InvalidTargetError",
            Self::Connect(_) => "ConnectError",
            Self::Request(_) => "RequestError",
            Self::Body(_) => "BodyError",
            Self::Timeout(_) => "TimeoutError",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("failed to read request body: {0}")]
    RequestBody(#[source] axum::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl RelayError {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RequestBody(_) => "RequestBodyError",
            Self::Transport(e) => e.kind(),
        }
    }

    /// Status code returned to the caller for this failure.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RequestBody(e) => {
                if body_limit_exceeded(e) {
                    StatusCode::PAYLOAD_TOO_LARGE
                } else {
                    StatusCode::BAD_REQUEST
                }
            }
            Self::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Fixed `error` message placed in the JSON failure body.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::RequestBody(_) => "Failed to read request body",
            Self::Transport(_) => "Failed to reach API server",
        }
    }
}

fn body_limit_exceeded(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<http_body_util::LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
