//! Per-request timing log, gated by the `Diagnostics` toggle.
//!
//! Responsibility:
//! - Measure wall-clock time per request and emit it under the
//!   `profiler` target.
//! - Stay silent while the toggle is off (the alive handler suspends it
//!   so the probes are not skewed by instrumentation).

use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

pub async fn profile(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(req).await;

    // Checked after the handler ran: a handler-held suspension guard is
    // still alive at this point (it travels in the response extensions).
    if state.diagnostics.profiler_enabled() {
        tracing::debug!(
            target: "profiler",
            %method,
            path,
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request profiled"
        );
    }

    response
}
