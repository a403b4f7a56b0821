//! Tailspin Forwarder relays storefront API calls to the backend API server.
//!
//! Every inbound request whose path contains `/api/` is forwarded to the
//! configured backend origin with the same method, headers and body, and
//! the backend's response is relayed back unchanged. Each exchange carries
//! an `X-Correlation-ID` on both legs and produces structured JSON log
//! lines. A backend that cannot be reached yields a fixed `502` JSON body.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, health).
//! - [`config`] -- Immutable forwarder configuration and origin validation.
//! - [`correlation`] -- Correlation ID resolution and generation.
//! - [`error`] -- Error types using `thiserror`.
//! - [`health`] -- `GET /health` endpoint handler returning runtime diagnostics.
//! - [`logging`] -- Process tracing setup with JSON and pretty-print output.
//! - [`middleware`] -- The `/api/` gate placed in front of the host router.
//! - [`proxy`] -- Core forwarding: header construction, the outbound call,
//!   and failure translation.
//! - [`request_log`] -- Per-request log entries and the [`LogSink`](request_log::LogSink) trait.
//! - [`server`] -- Axum server setup, shared application state, HTTP client, and
//!   graceful shutdown.

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod correlation;
pub mod error;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod proxy;
pub mod request_log;
pub mod server;
