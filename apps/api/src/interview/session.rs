//! Session controller. Drives one interview session through a fixed number of
//! question / answer / feedback cycles and hands the finished session to persistence.
//!
//! ```text
//! Idle ─select─▶ CategorySelected ─question─▶ AnswerPending ─answer─▶ Evaluated
//!                                                  ▲                      │
//!                                                  └──advance (n < cap)───┤
//!                                                                         ▼
//!                                                     Complete ◀─advance (n == cap)
//! ```
//!
//! Collaborator calls run first and state is committed only when they succeed,
//! so a failed generation or evaluation leaves the controller exactly where it was.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::interview::category::{Category, UnknownCategory};
use crate::interview::coach::{EvaluationRequest, InterviewCoach, QuestionRequest};
use crate::interview::feedback::{average_score, Feedback};
use crate::llm_client::LlmError;
use crate::models::{QuestionResult, SessionRecord};
use crate::storage::ProgressStore;

pub const DEFAULT_QUESTION_CAP: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Questions per session. A session completes when this many are answered.
    pub question_cap: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            question_cap: DEFAULT_QUESTION_CAP,
        }
    }
}

/// How an answer was produced. Text and voice are evaluated alike.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerModality {
    #[default]
    Text,
    Voice,
    Code {
        language: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    CategorySelected,
    /// A question is shown and waits for an answer.
    AnswerPending,
    /// The current answer has feedback.
    Evaluated,
    Complete,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::CategorySelected => "category selected",
            SessionPhase::AnswerPending => "waiting for an answer",
            SessionPhase::Evaluated => "evaluated",
            SessionPhase::Complete => "complete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Unsupported interview category: {0}")]
    InvalidCategory(String),

    #[error("Select an interview category first")]
    CategoryNotSelected,

    #[error("Failed to generate question: {0}")]
    GenerationFailure(#[source] LlmError),

    #[error("Failed to evaluate answer: {0}")]
    EvaluationFailure(#[source] LlmError),

    #[error("Answer cannot be empty")]
    EmptyInput,

    #[error("Cannot {action} while the session is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: SessionPhase,
    },

    #[error("All {cap} questions have been answered; advance to finish the session")]
    CapReached { cap: u32 },
}

impl From<UnknownCategory> for SessionError {
    fn from(e: UnknownCategory) -> Self {
        SessionError::InvalidCategory(e.0)
    }
}

/// Result of [`SessionController::advance`].
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    NextQuestion(String),
    Completed(SessionRecord),
}

/// Serializable view of the controller for the HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub username: String,
    pub category: Option<Category>,
    pub phase: SessionPhase,
    pub question_number: u32,
    pub question_cap: u32,
    pub current_question: Option<String>,
    pub answer: Option<String>,
    pub feedback: Option<Feedback>,
    pub results: Vec<QuestionResult>,
    pub completed: Option<SessionRecord>,
}

pub struct SessionController {
    username: String,
    config: SessionConfig,
    coach: Arc<dyn InterviewCoach>,
    progress: ProgressStore,
    category: Option<Category>,
    phase: SessionPhase,
    question_count: u32,
    current_question: Option<String>,
    answer: Option<String>,
    feedback: Option<Feedback>,
    results: Vec<QuestionResult>,
    completed: Option<SessionRecord>,
}

impl SessionController {
    pub fn new(
        username: impl Into<String>,
        config: SessionConfig,
        coach: Arc<dyn InterviewCoach>,
        progress: ProgressStore,
    ) -> Self {
        Self {
            username: username.into(),
            config,
            coach,
            progress,
            category: None,
            phase: SessionPhase::Idle,
            question_count: 0,
            current_question: None,
            answer: None,
            feedback: None,
            results: Vec::new(),
            completed: None,
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[cfg(test)]
    pub fn category(&self) -> Option<Category> {
        self.category
    }

    #[cfg(test)]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    #[cfg(test)]
    pub fn results(&self) -> &[QuestionResult] {
        &self.results
    }

    /// A session is in progress once its first question was requested, and stays so
    /// until restarted. The category is locked for that whole span.
    fn in_progress(&self) -> bool {
        self.question_count > 0 || self.phase == SessionPhase::Complete
    }

    pub fn select_category(&mut self, category_id: &str) -> Result<(), SessionError> {
        let category: Category = category_id.parse()?;
        if self.in_progress() {
            info!(
                "Ignoring category change to {category} for {}: session in progress",
                self.username
            );
            return Ok(());
        }
        self.category = Some(category);
        self.phase = SessionPhase::CategorySelected;
        Ok(())
    }

    pub async fn request_next_question(&mut self) -> Result<String, SessionError> {
        let category = self.category.ok_or(SessionError::CategoryNotSelected)?;

        let is_first = match self.phase {
            SessionPhase::CategorySelected => true,
            SessionPhase::Evaluated => false,
            phase => {
                return Err(SessionError::InvalidTransition {
                    action: "request a question",
                    phase,
                })
            }
        };
        let answered = if is_first { 0 } else { self.question_count };
        if answered >= self.config.question_cap {
            return Err(SessionError::CapReached {
                cap: self.config.question_cap,
            });
        }

        let request = QuestionRequest {
            category,
            question_number: answered + 1,
            context: self.progress.load_context(&self.username).await,
        };
        let question = self
            .coach
            .generate_question(&request)
            .await
            .map_err(SessionError::GenerationFailure)?;
        let question = question.trim();
        if question.is_empty() {
            return Err(SessionError::GenerationFailure(LlmError::EmptyContent));
        }

        if is_first {
            self.results.clear();
            self.completed = None;
        }
        self.question_count = request.question_number;
        self.current_question = Some(question.to_string());
        self.answer = None;
        self.feedback = None;
        self.phase = SessionPhase::AnswerPending;

        info!(
            "{}: {category} question {}/{}",
            self.username, self.question_count, self.config.question_cap
        );
        Ok(question.to_string())
    }

    pub async fn submit_answer(
        &mut self,
        answer_text: &str,
        modality: AnswerModality,
    ) -> Result<Feedback, SessionError> {
        let answer = answer_text.trim();
        if answer.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        let (category, question) = match (self.phase, self.category, &self.current_question) {
            (SessionPhase::AnswerPending, Some(category), Some(question)) => {
                (category, question.clone())
            }
            (phase, _, _) => {
                return Err(SessionError::InvalidTransition {
                    action: "submit an answer",
                    phase,
                })
            }
        };

        let request = EvaluationRequest {
            question,
            answer: answer.to_string(),
            category,
            modality,
        };
        let feedback = self
            .coach
            .evaluate_answer(&request)
            .await
            .map_err(SessionError::EvaluationFailure)?;

        self.results.push(QuestionResult {
            question: request.question,
            answer: request.answer.clone(),
            feedback: feedback.clone(),
            question_number: self.question_count,
        });
        self.answer = Some(request.answer);
        self.feedback = Some(feedback.clone());
        self.phase = SessionPhase::Evaluated;

        info!(
            "{}: question {} scored {}/10",
            self.username, self.question_count, feedback.score
        );
        Ok(feedback)
    }

    /// Moves to the next question, or completes the session once the cap is reached.
    pub async fn advance(&mut self) -> Result<Advance, SessionError> {
        if self.phase == SessionPhase::Evaluated && self.question_count >= self.config.question_cap
        {
            return self.complete().await.map(Advance::Completed);
        }
        self.request_next_question()
            .await
            .map(Advance::NextQuestion)
    }

    async fn complete(&mut self) -> Result<SessionRecord, SessionError> {
        let category = self.category.ok_or(SessionError::CategoryNotSelected)?;
        if self.results.len() as u32 != self.question_count {
            warn!(
                "{}: completing with {} results for {} questions",
                self.username,
                self.results.len(),
                self.question_count
            );
        }

        let record = SessionRecord {
            id: Uuid::new_v4(),
            date: Utc::now(),
            category,
            results: self.results.clone(),
            average_score: average_score(self.results.iter().map(|r| r.feedback.score)),
        };
        self.phase = SessionPhase::Complete;
        self.completed = Some(record.clone());

        self.progress
            .record_completed_session(&self.username, &record)
            .await;
        Ok(record)
    }

    /// Clears the session and keeps the category for another run.
    pub fn restart(&mut self) {
        self.clear_session();
        self.phase = if self.category.is_some() {
            SessionPhase::CategorySelected
        } else {
            SessionPhase::Idle
        };
    }

    /// Clears the session and the category.
    pub fn switch_category(&mut self) {
        self.clear_session();
        self.category = None;
        self.phase = SessionPhase::Idle;
    }

    fn clear_session(&mut self) {
        self.question_count = 0;
        self.current_question = None;
        self.answer = None;
        self.feedback = None;
        self.results.clear();
        self.completed = None;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            username: self.username.clone(),
            category: self.category,
            phase: self.phase,
            question_number: self.question_count,
            question_cap: self.config.question_cap,
            current_question: self.current_question.clone(),
            answer: self.answer.clone(),
            feedback: self.feedback.clone(),
            results: self.results.clone(),
            completed: self.completed.clone(),
        }
    }
}
