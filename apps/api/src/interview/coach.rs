//! Interview coach: pluggable, trait-based question generator and answer evaluator.
//!
//! Default: `GeminiCoach` (calls the generative-language API through `LlmClient`).
//!
//! `AppState` holds an `Arc<dyn InterviewCoach>`; tests swap in a scripted fake.

use async_trait::async_trait;
use tracing::info;

use crate::interview::category::Category;
use crate::interview::feedback::{Feedback, RawFeedback};
use crate::interview::prompts::{build_evaluation_prompt, build_question_prompt};
use crate::interview::session::AnswerModality;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, PLAIN_TEXT_SYSTEM};
use crate::llm_client::{GenerationParams, LlmClient, LlmError};
use crate::models::InterviewContext;

/// Everything needed to generate one question.
#[derive(Debug, Clone)]
pub struct QuestionRequest {
    pub category: Category,
    /// 1-based position of the question within the session.
    pub question_number: u32,
    pub context: InterviewContext,
}

/// Everything needed to evaluate one answer.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub question: String,
    pub answer: String,
    pub category: Category,
    pub modality: AnswerModality,
}

/// The question/evaluation collaborator. Implement this to swap backends
/// without touching the session controller or handlers.
#[async_trait]
pub trait InterviewCoach: Send + Sync {
    async fn generate_question(&self, request: &QuestionRequest) -> Result<String, LlmError>;

    async fn evaluate_answer(&self, request: &EvaluationRequest) -> Result<Feedback, LlmError>;
}

/// Coach backed by the Gemini API.
pub struct GeminiCoach {
    llm: LlmClient,
}

impl GeminiCoach {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl InterviewCoach for GeminiCoach {
    async fn generate_question(&self, request: &QuestionRequest) -> Result<String, LlmError> {
        let prompt = build_question_prompt(
            request.category,
            request.question_number,
            &request.context,
        );
        info!(
            "Generating {} question #{} (context: {})",
            request.category,
            request.question_number,
            !request.context.is_empty()
        );
        self.llm
            .call_text(&prompt, Some(PLAIN_TEXT_SYSTEM), GenerationParams::CREATIVE)
            .await
    }

    async fn evaluate_answer(&self, request: &EvaluationRequest) -> Result<Feedback, LlmError> {
        let prompt = build_evaluation_prompt(
            &request.question,
            &request.answer,
            request.category,
            &request.modality,
        );
        let raw: RawFeedback = self
            .llm
            .call_json(&prompt, Some(JSON_ONLY_SYSTEM), GenerationParams::PRECISE)
            .await?;
        Feedback::try_from(raw).map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted coach used by controller and router tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub(crate) struct ScriptedCoach {
        scores: Mutex<VecDeque<u8>>,
        fail_questions: Mutex<bool>,
        fail_evaluations: Mutex<bool>,
        pub(crate) question_requests: Mutex<Vec<QuestionRequest>>,
        pub(crate) evaluation_requests: Mutex<Vec<EvaluationRequest>>,
    }

    impl ScriptedCoach {
        pub(crate) fn with_scores(scores: &[u8]) -> Self {
            Self {
                scores: Mutex::new(scores.iter().copied().collect()),
                ..Self::default()
            }
        }

        pub(crate) fn fail_questions(&self, fail: bool) {
            *self.fail_questions.lock().unwrap() = fail;
        }

        pub(crate) fn fail_evaluations(&self, fail: bool) {
            *self.fail_evaluations.lock().unwrap() = fail;
        }
    }

    #[async_trait]
    impl InterviewCoach for ScriptedCoach {
        async fn generate_question(&self, request: &QuestionRequest) -> Result<String, LlmError> {
            if *self.fail_questions.lock().unwrap() {
                return Err(LlmError::Api {
                    status: 503,
                    message: "service unavailable".to_string(),
                });
            }
            self.question_requests.lock().unwrap().push(request.clone());
            Ok(format!(
                "{} question #{}",
                request.category.label(),
                request.question_number
            ))
        }

        async fn evaluate_answer(&self, request: &EvaluationRequest) -> Result<Feedback, LlmError> {
            if *self.fail_evaluations.lock().unwrap() {
                return Err(LlmError::EmptyContent);
            }
            self.evaluation_requests
                .lock()
                .unwrap()
                .push(request.clone());
            let score = self.scores.lock().unwrap().pop_front().unwrap_or(5);
            Ok(Feedback {
                score,
                overall: "Good".to_string(),
                strengths: "Structured".to_string(),
                improvements: "More detail".to_string(),
                suggestions: "Use numbers".to_string(),
            })
        }
    }
}
