use crate::observability::AppMetrics;
use crate::services::AssistantService;
use std::sync::Arc;

/// Shared state behind the chat routes
#[derive(Clone)]
pub struct AppState {
    /// Conversation and tracking operations
    pub assistant: Arc<AssistantService>,
    /// Request counters
    pub metrics: Arc<AppMetrics>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("assistant", &"Arc<AssistantService>")
            .field("metrics", &"Arc<AppMetrics>")
            .finish()
    }
}

impl AppState {
    pub fn new(assistant: AssistantService, metrics: Arc<AppMetrics>) -> Self {
        Self {
            assistant: Arc::new(assistant),
            metrics,
        }
    }
}
