/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - checker: 3 probe を束ねた HealthCheck, diagnostics: profiler toggle
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::diagnostics::Diagnostics;
use crate::services::health::HealthCheck;

#[derive(Clone)]
pub struct AppState {
    pub checker: Arc<dyn HealthCheck>,
    pub diagnostics: Diagnostics,
}

impl AppState {
    pub fn new(checker: Arc<dyn HealthCheck>, diagnostics: Diagnostics) -> Self {
        Self {
            checker,
            diagnostics,
        }
    }
}
