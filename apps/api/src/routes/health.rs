use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and a few runtime facts.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "coach",
        "model": state.config.gemini_model,
        "questions_per_session": state.config.session.question_cap,
        "active_sessions": state.sessions.active_sessions().await
    }))
}
