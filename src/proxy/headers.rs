//! Header handling for both legs of a forwarded request.
//!
//! [`outbound_headers`] copies the caller's headers, drops hop-by-hop
//! headers, points `Host` at the backend and stamps the correlation ID.
//! [`relayed_headers`] does the same stripping for the backend's
//! response and adds the correlation ID on the way back.

use std::sync::LazyLock;

use axum::http::header::{CONTENT_LENGTH, HOST};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Uri};

use crate::correlation::{self, CorrelationId};

static HOP_BY_HOP: LazyLock<Vec<HeaderName>> = LazyLock::new(|| {
    [
        "connection",
        "keep-alive",
        "transfer-encoding",
        "te",
        "trailer",
        "upgrade",
        "proxy-authorization",
        "proxy-authenticate",
    ]
    .iter()
    .filter_map(|name| name.parse::<HeaderName>().ok())
    .collect()
});

pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
}

fn set_correlation_id(headers: &mut HeaderMap, correlation_id: &CorrelationId) {
    if let Some(val) = correlation_id.header_value() {
        headers.insert(correlation::HEADER, val);
    }
}

/// Headers for the request sent to the backend.
///
/// When `with_body` is false the request goes out with an empty body, so
/// any `content-length` the caller sent is dropped too.
pub fn outbound_headers(
    original: &HeaderMap,
    target: &Uri,
    correlation_id: &CorrelationId,
    with_body: bool,
) -> HeaderMap {
    let mut headers = original.clone();
    strip_hop_by_hop(&mut headers);

    if !with_body {
        headers.remove(CONTENT_LENGTH);
    }

    if let Some(authority) = target.authority() {
        if let Ok(val) = HeaderValue::from_str(authority.as_str()) {
            headers.insert(HOST, val);
        }
    }

    set_correlation_id(&mut headers, correlation_id);
    headers
}

/// Headers relayed to the caller from the backend response.
///
/// The body is relayed byte-for-byte, so the backend's `content-length`
/// stays accurate and is kept.
pub fn relayed_headers(mut backend: HeaderMap, correlation_id: &CorrelationId) -> HeaderMap {
    strip_hop_by_hop(&mut backend);
    set_correlation_id(&mut backend, correlation_id);
    backend
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(value: &'static str) -> CorrelationId {
        let mut headers = HeaderMap::new();
        headers.insert(correlation::HEADER, HeaderValue::from_static(value));
        correlation::resolve(&headers).into_id()
    }

    #[test]
    fn strips_hop_by_hop() {
        let mut original = HeaderMap::new();
        original.insert("connection", "keep-alive".parse().unwrap());
        original.insert("transfer-encoding", "chunked".parse().unwrap());
        original.insert("content-type", "application/json".parse().unwrap());

        let target: Uri = "http://target:8080/api/games".parse().unwrap();
        let result = outbound_headers(&original, &target, &cid("test-id"), true);

        assert!(result.get("connection").is_none());
        assert!(result.get("transfer-encoding").is_none());
        assert_eq!(result.get("content-type").unwrap(), "application/json");
    }

    #[test]
    fn rewrites_host() {
        let mut original = HeaderMap::new();
        original.insert(HOST, "storefront.local:4321".parse().unwrap());
        let target: Uri = "http://backend:5100/api/games".parse().unwrap();
        let result = outbound_headers(&original, &target, &cid("test-id"), false);

        assert_eq!(result.get(HOST).unwrap(), "backend:5100");
    }

    #[test]
    fn overwrites_correlation_id() {
        let mut original = HeaderMap::new();
        original.insert(correlation::HEADER, "stale".parse().unwrap());
        let target: Uri = "http://backend:5100/api/games".parse().unwrap();
        let result = outbound_headers(&original, &target, &cid("fresh"), false);

        assert_eq!(result.get(correlation::HEADER).unwrap(), "fresh");
        assert_eq!(result.get_all(correlation::HEADER).iter().count(), 1);
    }

    #[test]
    fn bodiless_request_drops_content_length() {
        let mut original = HeaderMap::new();
        original.insert(CONTENT_LENGTH, "17".parse().unwrap());
        let target: Uri = "http://backend:5100/api/games".parse().unwrap();

        let without = outbound_headers(&original, &target, &cid("x"), false);
        assert!(without.get(CONTENT_LENGTH).is_none());

        let with = outbound_headers(&original, &target, &cid("x"), true);
        assert_eq!(with.get(CONTENT_LENGTH).unwrap(), "17");
    }

    #[test]
    fn relayed_headers_keep_backend_headers() {
        let mut backend = HeaderMap::new();
        backend.insert("content-type", "application/json".parse().unwrap());
        backend.insert("x-backend-node", "api-2".parse().unwrap());
        backend.append("set-cookie", "a=1".parse().unwrap());
        backend.append("set-cookie", "b=2".parse().unwrap());
        backend.insert("connection", "close".parse().unwrap());

        let result = relayed_headers(backend, &cid("abc-123"));

        assert_eq!(result.get("content-type").unwrap(), "application/json");
        assert_eq!(result.get("x-backend-node").unwrap(), "api-2");
        assert_eq!(result.get_all("set-cookie").iter().count(), 2);
        assert!(result.get("connection").is_none());
        assert_eq!(result.get(correlation::HEADER).unwrap(), "abc-123");
    }
}
