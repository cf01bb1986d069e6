use serde::{Deserialize, Serialize};

/// Optional resume / job-description text used to personalize questions.
/// Blank fields are stored as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
}

impl InterviewContext {
    pub fn new(resume_text: Option<String>, job_description: Option<String>) -> Self {
        Self {
            resume_text: non_blank(resume_text),
            job_description: non_blank(job_description),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.resume_text.is_none() && self.job_description.is_none()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
