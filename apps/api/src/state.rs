use std::sync::Arc;

use crate::config::Config;
use crate::interview::registry::SessionRegistry;
use crate::storage::ProgressStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub progress: ProgressStore,
    /// Live interview sessions, one controller per user.
    pub sessions: Arc<SessionRegistry>,
    pub config: Config,
}
