//! `tailspin-forwarder health` — ask a running forwarder how it is doing.
//!
//! The request goes out through the same pooled client and single-timeout
//! exchange the forwarder uses for API traffic.

use std::fmt::Write as _;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

use crate::cli::HealthArgs;
use crate::error::ForwarderError;
use crate::health::HealthResponse;
use crate::proxy::upstream::{self, UpstreamRequest};
use crate::server::build_http_client;

const CHECK_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn execute(args: HealthArgs) -> Result<(), ForwarderError> {
    let body = fetch_health(&args.url).await?;

    if args.json {
        println!("{}", String::from_utf8_lossy(&body));
        return Ok(());
    }

    match serde_json::from_slice::<HealthResponse>(&body) {
        Ok(health) => print!("{}", render_summary(&args.url, &health)),
        Err(e) => {
            eprintln!("Failed to parse health response: {e}");
            println!("{}", String::from_utf8_lossy(&body));
        }
    }
    Ok(())
}

async fn fetch_health(base: &str) -> Result<Bytes, ForwarderError> {
    let uri = health_uri(base)?;
    let request = UpstreamRequest {
        method: Method::GET,
        uri,
        headers: HeaderMap::new(),
        body: Bytes::new(),
    };

    let response = upstream::send(&build_http_client(), request, CHECK_TIMEOUT)
        .await
        .map_err(|e| ForwarderError::HttpRequest {
            source: Box::new(e),
        })?;

    if !response.parts.status.is_success() {
        return Err(ForwarderError::HealthCheckFailed(response.parts.status));
    }
    Ok(response.body)
}

fn health_uri(base: &str) -> Result<Uri, ForwarderError> {
    format!("{}/health", base.trim_end_matches('/'))
        .parse()
        .map_err(|e: http::uri::InvalidUri| ForwarderError::UriParse {
            source: Box::new(e),
        })
}

fn render_summary(url: &str, health: &HealthResponse) -> String {
    let backend = &health.backend;
    let stats = &health.stats;
    let total = stats.requests_forwarded + stats.requests_failed;

    let mut out = String::new();
    let _ = writeln!(out, "\u{2713} tailspin-forwarder is {} ({url})", health.status);
    let _ = writeln!(out, "  version:      {}", health.version);
    let _ = writeln!(out, "  uptime:       {}", format_uptime(health.uptime_seconds));
    let _ = writeln!(out, "  forwarding:   /api/* -> {}", backend.origin);
    let _ = writeln!(
        out,
        "  environment:  {} (timeout {}ms)",
        backend.environment, backend.timeout_ms
    );
    let _ = writeln!(
        out,
        "  requests:     {total} total, {} failed{}",
        stats.requests_failed,
        failure_rate(stats.requests_failed, total)
    );
    out
}

fn failure_rate(failed: u64, total: u64) -> String {
    if total == 0 {
        return String::new();
    }
    #[allow(clippy::cast_precision_loss)]
    let percent = failed as f64 * 100.0 / total as f64;
    format!(" ({percent:.1}%)")
}

fn format_uptime(seconds: u64) -> String {
    let (hours, minutes, secs) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    match (hours, minutes) {
        (0, 0) => format!("{secs}s"),
        (0, _) => format!("{minutes}m {secs}s"),
        _ => format!("{hours}h {minutes}m {secs}s"),
    }
}
