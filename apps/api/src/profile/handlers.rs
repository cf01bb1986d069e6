//! Axum route handlers for login, profiles and the session dashboard.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::UserProfile;
use crate::profile::dashboard::{summarize_history, SessionSummary};
use crate::state::AppState;
use crate::storage::progress::{normalize_username, MIN_USERNAME_LEN};
use crate::storage::ProgressStore;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

/// Resolves a path username to an existing profile's name.
/// Users appear only after logging in.
pub async fn require_user(progress: &ProgressStore, raw: &str) -> Result<String, AppError> {
    let username = normalize_username(raw)
        .ok_or_else(|| AppError::NotFound(format!("User '{raw}' not found")))?;
    match progress.find_profile(&username).await {
        Some(_) => Ok(username),
        None => Err(AppError::NotFound(format!("User '{username}' not found"))),
    }
}

/// POST /api/v1/login
///
/// Creates the profile on first login; returns it either way.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let username = normalize_username(&request.username).ok_or_else(|| {
        AppError::Validation(format!(
            "Username must be at least {MIN_USERNAME_LEN} characters"
        ))
    })?;
    Ok(Json(state.progress.login(&username).await))
}

/// GET /api/v1/users/:username/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>, AppError> {
    let username = normalize_username(&username)
        .ok_or_else(|| AppError::NotFound(format!("User '{username}' not found")))?;
    state
        .progress
        .find_profile(&username)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("User '{username}' not found")))
}

/// GET /api/v1/users/:username/sessions
pub async fn handle_session_history(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<SessionSummary>>, AppError> {
    let username = require_user(&state.progress, &username).await?;
    let history = state.progress.session_history(&username).await;
    Ok(Json(summarize_history(&history)))
}
