//! Dashboard view over a user's completed sessions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::interview::category::Category;
use crate::interview::feedback::Performance;
use crate::models::SessionRecord;

/// One row of the session history table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub category: Category,
    pub category_label: &'static str,
    pub average_score: f64,
    pub performance: &'static str,
    /// Per-question scores in answer order.
    pub scores: Vec<u8>,
}

impl From<&SessionRecord> for SessionSummary {
    fn from(record: &SessionRecord) -> Self {
        Self {
            id: record.id,
            date: record.date,
            category: record.category,
            category_label: record.category.label(),
            average_score: record.average_score,
            performance: Performance::from_score(record.average_score).label(),
            scores: record.results.iter().map(|r| r.feedback.score).collect(),
        }
    }
}

/// Summaries newest first. Stored history is oldest first.
pub fn summarize_history(history: &[SessionRecord]) -> Vec<SessionSummary> {
    history.iter().rev().map(SessionSummary::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::feedback::Feedback;
    use crate::models::QuestionResult;
    use chrono::Duration;

    fn record(scores: &[u8], days_ago: i64) -> SessionRecord {
        let results = scores
            .iter()
            .enumerate()
            .map(|(i, &score)| QuestionResult {
                question: format!("Q{i}"),
                answer: format!("A{i}"),
                feedback: Feedback {
                    score,
                    overall: "Good".to_string(),
                    strengths: String::new(),
                    improvements: String::new(),
                    suggestions: String::new(),
                },
                question_number: i as u32 + 1,
            })
            .collect();
        SessionRecord {
            id: Uuid::new_v4(),
            date: Utc::now() - Duration::days(days_ago),
            category: Category::Behavioral,
            results,
            average_score: crate::interview::feedback::average_score(scores.iter().copied()),
        }
    }

    #[test]
    fn test_history_is_newest_first_with_labels() {
        let history = vec![record(&[3, 4], 2), record(&[9, 8], 1)];
        let summaries = summarize_history(&history);

        assert_eq!(summaries[0].id, history[1].id);
        assert_eq!(summaries[0].performance, "Excellent");
        assert_eq!(summaries[0].scores, vec![9, 8]);
        assert_eq!(summaries[1].performance, "Needs Improvement");
        assert_eq!(summaries[1].category_label, "Behavioral Interview");
    }

    #[test]
    fn test_empty_history() {
        assert!(summarize_history(&[]).is_empty());
    }
}
