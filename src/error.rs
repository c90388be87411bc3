/*
 * Responsibility
 * - probe 失敗を HTTP response に変換 (500 + {"error": "<reason>"})
 * - reason は ProbeError の Display をそのまま載せる (monitor が原因を読めるように)
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::services::health::ProbeError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ProbeError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
