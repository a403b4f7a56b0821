//! A single outbound call to the backend.
//!
//! The whole exchange (connect, response head, body) runs under one
//! timeout. The call is awaited inline so that dropping the caller's
//! handler future also drops the in-flight request.

use std::time::Duration;

use bytes::Bytes;
use http::response::Parts;
use http::{HeaderMap, Method, Uri};
use http_body_util::{BodyExt, Full};

use crate::error::TransportError;
use crate::server::HttpClient;

#[derive(Debug)]
pub struct UpstreamResponse {
    pub parts: Parts,
    pub body: Bytes,
}

pub struct UpstreamRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

pub async fn send(
    client: &HttpClient,
    request: UpstreamRequest,
    timeout: Duration,
) -> Result<UpstreamResponse, TransportError> {
    let mut outbound = hyper::Request::new(Full::new(request.body));
    *outbound.method_mut() = request.method;
    *outbound.uri_mut() = request.uri;
    *outbound.headers_mut() = request.headers;

    let exchange = async {
        let response = client
            .request(outbound)
            .await
            .map_err(TransportError::from_client)?;
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(TransportError::Body)?
            .to_bytes();
        Ok::<_, TransportError>(UpstreamResponse { parts, body })
    };

    tokio::time::timeout(timeout, exchange)
        .await
        .map_err(|_| TransportError::Timeout(timeout))?
}
