pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::context::handlers as context;
use crate::interview::handlers as interview;
use crate::profile::handlers as profile;
use crate::state::AppState;

/// Upper bound for resume uploads.
const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/categories", get(interview::handle_list_categories))
        // Users
        .route("/api/v1/login", post(profile::handle_login))
        .route(
            "/api/v1/users/:username/profile",
            get(profile::handle_get_profile),
        )
        .route(
            "/api/v1/users/:username/sessions",
            get(profile::handle_session_history),
        )
        // Interview context
        .route(
            "/api/v1/users/:username/context",
            get(context::handle_get_context)
                .put(context::handle_put_context)
                .delete(context::handle_clear_context),
        )
        .route(
            "/api/v1/users/:username/context/resume",
            post(context::handle_upload_resume).layer(DefaultBodyLimit::max(MAX_RESUME_BYTES)),
        )
        // Live session
        .route(
            "/api/v1/users/:username/session",
            get(interview::handle_get_session),
        )
        .route(
            "/api/v1/users/:username/session/category",
            post(interview::handle_select_category),
        )
        .route(
            "/api/v1/users/:username/session/question",
            post(interview::handle_request_question),
        )
        .route(
            "/api/v1/users/:username/session/answer",
            post(interview::handle_submit_answer),
        )
        .route(
            "/api/v1/users/:username/session/answer/voice",
            post(interview::handle_submit_voice_answer),
        )
        .route(
            "/api/v1/users/:username/session/advance",
            post(interview::handle_advance),
        )
        .route(
            "/api/v1/users/:username/session/restart",
            post(interview::handle_restart),
        )
        .route(
            "/api/v1/users/:username/session/switch",
            post(interview::handle_switch_category),
        )
        .with_state(state)
}
