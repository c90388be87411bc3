/*
 * Responsibility
 * - GET /alive (liveness)
 * - filesystem → database → cache の順で probe を実行、最初の失敗で打ち切り
 * - 200 "OK" または 500 {"error": "<reason>"} を返す
 */
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::state::AppState;

pub async fn alive(State(state): State<AppState>) -> Response {
    // The probes are timing-sensitive; keep the profiler out of the way.
    let profiler = state.diagnostics.suspend_profiler();

    let mut response = match state.checker.check().await {
        Ok(()) => (StatusCode::OK, "OK").into_response(),
        Err(e) => e.into_response(),
    };

    // The liveness verdict must never be served stale, neither by an
    // intermediary nor by the framework's own caching.
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, max-age=0"),
    );

    // The guard rides in the extensions so the profiler stays suspended
    // until the response has left the middleware stack.
    response.extensions_mut().insert(Arc::new(profiler));

    response
}
