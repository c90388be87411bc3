/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /alive は liveness 専用 (auth なし、監視系からそのまま叩ける)
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::alive::alive;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/alive", get(alive))
}
