//! Axum route handlers for the interview session API.
//!
//! Every handler resolves the user, locks that user's controller for the
//! duration of the call and returns the resulting session snapshot.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::AppError;
use crate::interview::category::{catalog, CategoryInfo};
use crate::interview::feedback::Feedback;
use crate::interview::session::{AnswerModality, SessionSnapshot};
use crate::interview::transcript::{self, TranscriptEvent};
use crate::profile::handlers::require_user;
use crate::state::AppState;

const TRANSCRIPT_CHANNEL_CAPACITY: usize = 32;

/// Longest a voice answer may take to replay before the transcript is cut off.
const TRANSCRIPT_DEADLINE: Duration = Duration::from_secs(30);

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SelectCategoryRequest {
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
    #[serde(default)]
    pub modality: AnswerModality,
}

#[derive(Debug, Deserialize)]
pub struct VoiceAnswerRequest {
    pub events: Vec<TranscriptEvent>,
}

#[derive(Debug, Serialize)]
pub struct VoiceAnswerResponse {
    /// Committed transcript that was submitted as the answer.
    pub transcript: String,
    pub feedback: Feedback,
    pub session: SessionSnapshot,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/categories
pub async fn handle_list_categories() -> Json<Vec<CategoryInfo>> {
    Json(catalog())
}

/// GET /api/v1/users/:username/session
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let username = require_user(&state.progress, &username).await?;
    let session = state.sessions.session(&username).await;
    let controller = session.lock().await;
    Ok(Json(controller.snapshot()))
}

/// POST /api/v1/users/:username/session/category
pub async fn handle_select_category(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(request): Json<SelectCategoryRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let username = require_user(&state.progress, &username).await?;
    let session = state.sessions.session(&username).await;
    let mut controller = session.lock().await;
    controller.select_category(&request.category)?;
    Ok(Json(controller.snapshot()))
}

/// POST /api/v1/users/:username/session/question
pub async fn handle_request_question(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let username = require_user(&state.progress, &username).await?;
    let session = state.sessions.session(&username).await;
    let mut controller = session.lock().await;
    controller.request_next_question().await?;
    Ok(Json(controller.snapshot()))
}

/// POST /api/v1/users/:username/session/answer
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let username = require_user(&state.progress, &username).await?;
    let session = state.sessions.session(&username).await;
    let mut controller = session.lock().await;
    controller
        .submit_answer(&request.answer, request.modality)
        .await?;
    Ok(Json(controller.snapshot()))
}

/// POST /api/v1/users/:username/session/answer/voice
///
/// Replays recognizer events through a transcript subscription and submits
/// the committed text as a voice answer. Interim text is never submitted.
pub async fn handle_submit_voice_answer(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(request): Json<VoiceAnswerRequest>,
) -> Result<Json<VoiceAnswerResponse>, AppError> {
    let username = require_user(&state.progress, &username).await?;

    let (sink, subscription) = transcript::channel(TRANSCRIPT_CHANNEL_CAPACITY);
    let producer = tokio::spawn(async move {
        for event in request.events {
            if !sink.send(event).await {
                break;
            }
        }
    });
    let transcript = subscription
        .collect_final_within(TRANSCRIPT_DEADLINE)
        .await;
    // A producer still blocked on a cancelled subscription sees its sends fail.
    producer
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    let session = state.sessions.session(&username).await;
    let mut controller = session.lock().await;
    let feedback = controller
        .submit_answer(&transcript, AnswerModality::Voice)
        .await?;
    Ok(Json(VoiceAnswerResponse {
        transcript,
        feedback,
        session: controller.snapshot(),
    }))
}

/// POST /api/v1/users/:username/session/advance
///
/// Next question, or completion once every question is answered.
pub async fn handle_advance(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let username = require_user(&state.progress, &username).await?;
    let session = state.sessions.session(&username).await;
    let mut controller = session.lock().await;
    controller.advance().await?;
    Ok(Json(controller.snapshot()))
}

/// POST /api/v1/users/:username/session/restart
pub async fn handle_restart(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let username = require_user(&state.progress, &username).await?;
    let session = state.sessions.session(&username).await;
    let mut controller = session.lock().await;
    controller.restart();
    Ok(Json(controller.snapshot()))
}

/// POST /api/v1/users/:username/session/switch
pub async fn handle_switch_category(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let username = require_user(&state.progress, &username).await?;
    let session = state.sessions.session(&username).await;
    let mut controller = session.lock().await;
    controller.switch_category();
    Ok(Json(controller.snapshot()))
}
