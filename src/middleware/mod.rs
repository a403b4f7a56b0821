//! Predicate-gated forwarding layer.
//!
//! [`api_forwarding`] is installed with `axum::middleware::from_fn_with_state`
//! in front of the host router. Requests whose path contains `/api/` are
//! handed to the [`Forwarder`](crate::proxy::Forwarder); everything else
//! goes to `next` untouched.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::proxy;
use crate::server::AppState;

pub async fn api_forwarding(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !proxy::is_api_path(request.uri().path()) {
        return next.run(request).await;
    }
    state.forwarder.forward(request).await
}
