//! Correlation ID resolution.
//!
//! An inbound `X-Correlation-ID` is honored as-is so an upstream caller
//! can keep its trace going. Requests without one get a fresh ID made of
//! the current Unix time in milliseconds and a random hex suffix.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{HeaderMap, HeaderName, HeaderValue};

pub const HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

const SUFFIX_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    #[must_use]
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis());
        let random = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{millis}-{}", &random[..SUFFIX_LEN]))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.0).ok()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the request's correlation ID came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Inbound(CorrelationId),
    Generated(CorrelationId),
    /// A header was sent but could not be used (empty or not visible ASCII).
    Replaced(CorrelationId),
}

impl Resolved {
    #[must_use]
    pub fn into_id(self) -> CorrelationId {
        match self {
            Self::Inbound(id) | Self::Generated(id) | Self::Replaced(id) => id,
        }
    }
}

#[must_use]
pub fn resolve(headers: &HeaderMap) -> Resolved {
    let Some(value) = headers.get(&HEADER) else {
        return Resolved::Generated(CorrelationId::generate());
    };

    match value.to_str().map(str::trim) {
        Ok(id) if !id.is_empty() => Resolved::Inbound(CorrelationId(id.to_string())),
        _ => Resolved::Replaced(CorrelationId::generate()),
    }
}
