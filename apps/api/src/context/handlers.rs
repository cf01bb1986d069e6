use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::context::resume::{extract_resume_text, is_pdf, ResumeError};
use crate::errors::AppError;
use crate::models::InterviewContext;
use crate::profile::handlers::require_user;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ContextUpdate {
    #[serde(default)]
    pub resume_text: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
}

impl From<ResumeError> for AppError {
    fn from(e: ResumeError) -> Self {
        match e {
            ResumeError::NotPdf => AppError::Validation(e.to_string()),
            ResumeError::Extraction(_) | ResumeError::NoText => {
                AppError::UnprocessableEntity(e.to_string())
            }
            ResumeError::Task(e) => AppError::Internal(e.into()),
        }
    }
}

/// GET /api/v1/users/:username/context
pub async fn handle_get_context(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<InterviewContext>, AppError> {
    let username = require_user(&state.progress, &username).await?;
    Ok(Json(state.progress.load_context(&username).await))
}

/// PUT /api/v1/users/:username/context
///
/// Replaces both fields. Blank fields are dropped; an empty context clears storage.
pub async fn handle_put_context(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(update): Json<ContextUpdate>,
) -> Result<Json<InterviewContext>, AppError> {
    let username = require_user(&state.progress, &username).await?;
    let context = InterviewContext::new(update.resume_text, update.job_description);
    state.progress.save_context(&username, &context).await;
    Ok(Json(context))
}

/// DELETE /api/v1/users/:username/context
pub async fn handle_clear_context(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<StatusCode, AppError> {
    let username = require_user(&state.progress, &username).await?;
    state.progress.clear_context(&username).await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/users/:username/context/resume
///
/// Multipart upload of a single PDF. The extracted text replaces the stored
/// resume text and keeps the job description.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(username): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<InterviewContext>, AppError> {
    let username = require_user(&state.progress, &username).await?;

    let field = multipart
        .next_field()
        .await?
        .ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
    if !is_pdf(field.content_type(), field.file_name()) {
        return Err(ResumeError::NotPdf.into());
    }
    let file_name = field.file_name().unwrap_or("resume.pdf").to_string();
    let bytes = field.bytes().await?;

    let resume_text = extract_resume_text(bytes.to_vec()).await?;
    info!("Resume '{file_name}' uploaded for {username}");

    let current = state.progress.load_context(&username).await;
    let context = InterviewContext::new(Some(resume_text), current.job_description);
    state.progress.save_context(&username, &context).await;
    Ok(Json(context))
}
