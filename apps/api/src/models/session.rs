use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::interview::category::Category;
use crate::interview::feedback::Feedback;

/// One answered question. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question: String,
    pub answer: String,
    pub feedback: Feedback,
    pub question_number: u32,
}

/// A completed session as persisted in the user's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub category: Category,
    pub results: Vec<QuestionResult>,
    /// Mean of the result scores, fixed at completion time.
    pub average_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::feedback::average_score;
    use chrono::Utc;

    fn record_with_scores(scores: &[u8]) -> SessionRecord {
        let results = scores
            .iter()
            .enumerate()
            .map(|(i, &score)| QuestionResult {
                question: format!("Question {}", i + 1),
                answer: "Answer".to_string(),
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
            date: Utc::now(),
            category: Category::Technical,
            results,
            average_score: average_score(scores.iter().copied()),
        }
    }

    #[test]
    fn test_non_terminating_averages_survive_json() {
        // 83/9 and 13/11 lose their last bit without exact float parsing.
        let nine = [10, 10, 10, 10, 10, 10, 10, 10, 3];
        let eleven = [1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2];
        for scores in [&nine[..], &eleven[..]] {
            let record = record_with_scores(scores);
            let json = serde_json::to_string(&record).unwrap();
            let back: SessionRecord = serde_json::from_str(&json).unwrap();
            assert_eq!(back.average_score.to_bits(), record.average_score.to_bits());
            assert_eq!(back, record);
        }
    }

    #[test]
    fn test_every_average_up_to_twelve_answers_round_trips() {
        for count in 1..=12u32 {
            for total in count..=count * 10 {
                let average = total as f64 / count as f64;
                let json = serde_json::to_string(&average).unwrap();
                let back: f64 = serde_json::from_str(&json).unwrap();
                assert_eq!(back.to_bits(), average.to_bits(), "{total}/{count}");
            }
        }
    }
}
