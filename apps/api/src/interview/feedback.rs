//! Evaluation feedback, the typed record the coach returns for one answer.
//!
//! Model output is parsed into a lenient [`RawFeedback`] first and then
//! normalized into [`Feedback`]. Scores are integers in `1..=10`; anything
//! else is rounded and clamped here so nothing downstream sees an untyped or
//! out-of-range value.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub score: u8,
    pub overall: String,
    pub strengths: String,
    pub improvements: String,
    pub suggestions: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum FeedbackError {
    #[error("score '{0}' is not a number")]
    NonNumericScore(String),

    #[error("score is not finite")]
    NonFiniteScore,
}

/// Score as the model returned it: usually a number, occasionally a string like "8" or "8/10".
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawScore {
    Number(f64),
    Text(String),
}

/// Free-text field as the model returned it: a string or a list of points.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawText {
    Text(String),
    List(Vec<String>),
}

impl RawText {
    fn into_text(self) -> String {
        match self {
            RawText::Text(s) => s.trim().to_string(),
            RawText::List(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Evaluation JSON exactly as requested from the model. Every field is required.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFeedback {
    pub score: RawScore,
    pub overall: RawText,
    pub strengths: RawText,
    pub improvements: RawText,
    pub suggestions: RawText,
}

impl TryFrom<RawFeedback> for Feedback {
    type Error = FeedbackError;

    fn try_from(raw: RawFeedback) -> Result<Self, Self::Error> {
        let score = normalize_score(raw.score)?;
        let mut overall = raw.overall.into_text();
        if overall.is_empty() {
            overall = Performance::from_score(score as f64).label().to_string();
        }
        Ok(Feedback {
            score,
            overall,
            strengths: raw.strengths.into_text(),
            improvements: raw.improvements.into_text(),
            suggestions: raw.suggestions.into_text(),
        })
    }
}

fn normalize_score(raw: RawScore) -> Result<u8, FeedbackError> {
    let value = match raw {
        RawScore::Number(n) => n,
        RawScore::Text(s) => {
            // Accept "8" and "8/10"
            let head = s.split('/').next().unwrap_or_default().trim();
            head.parse::<f64>()
                .map_err(|_| FeedbackError::NonNumericScore(s.clone()))?
        }
    };
    if !value.is_finite() {
        return Err(FeedbackError::NonFiniteScore);
    }
    let rounded = value.round();
    let clamped = rounded.clamp(MIN_SCORE as f64, MAX_SCORE as f64);
    if clamped != rounded {
        warn!("Evaluation score {value} outside {MIN_SCORE}-{MAX_SCORE}, clamped to {clamped}");
    }
    Ok(clamped as u8)
}

/// Coarse performance band for a score or an average of scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Performance {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
}

impl Performance {
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            Performance::Excellent
        } else if score >= 6.0 {
            Performance::Good
        } else if score >= 4.0 {
            Performance::Average
        } else {
            Performance::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Performance::Excellent => "Excellent",
            Performance::Good => "Good",
            Performance::Average => "Average",
            Performance::NeedsImprovement => "Needs Improvement",
        }
    }
}

/// Arithmetic mean of the scores, 0.0 for an empty slice.
pub fn average_score(feedback: impl IntoIterator<Item = u8>) -> f64 {
    let (sum, count) = feedback
        .into_iter()
        .fold((0u32, 0u32), |(sum, count), s| (sum + s as u32, count + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}
