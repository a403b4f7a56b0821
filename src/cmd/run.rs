//! `tailspin-forwarder run` — start the forwarder.
//!
//! Builds the immutable [`ForwarderConfig`] from flags and environment,
//! starts the Axum server with the forwarding layer, and shuts down
//! gracefully on SIGTERM / Ctrl+C.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cli::RunArgs;
use crate::config::ForwarderConfig;
use crate::error::ForwarderError;
use crate::logging;
use crate::proxy::Forwarder;
use crate::request_log::StdoutSink;
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), ForwarderError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let config = ForwarderConfig::from_args(&args)?;
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    tracing::info!(
        addr = %addr,
        api_server_url = %config.backend_origin(),
        environment = %config.environment(),
        timeout_ms = u64::try_from(config.timeout().as_millis()).unwrap_or(u64::MAX),
        "tailspin-forwarder starting"
    );

    let forwarder = Forwarder::new(config, server::build_http_client(), Arc::new(StdoutSink));
    let state = Arc::new(AppState::new(forwarder));
    let router = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "tailspin-forwarder started");

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("tailspin-forwarder stopped");
    Ok(())
}
