use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::interview::category::Category;
use crate::models::session::SessionRecord;

/// Per-user aggregates. Created on first login, updated after every completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub total_sessions: u32,
    /// Best session average seen so far, 0–10.
    #[serde(default)]
    pub best_score: f64,
    #[serde(default)]
    pub categories_completed: BTreeSet<Category>,
}

impl UserProfile {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            total_sessions: 0,
            best_score: 0.0,
            categories_completed: BTreeSet::new(),
        }
    }

    /// Folds a completed session into the aggregates.
    pub fn record_session(&mut self, record: &SessionRecord) {
        self.total_sessions += 1;
        self.best_score = self.best_score.max(record.average_score);
        self.categories_completed.insert(record.category);
    }
}
