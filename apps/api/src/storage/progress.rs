//! Typed persistence for a user's profile, completed sessions and interview context.
//!
//! Reads never fail: a missing key, a backend error or malformed JSON all
//! degrade to the default value (logged as a persistence read failure).
//! Writes are best-effort and are not retried. Profile and history are
//! separate keys, so one write can land without the other.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, warn};

use crate::models::{InterviewContext, SessionRecord, UserProfile};
use crate::storage::{KeyValueStore, StorageError};

pub const MIN_USERNAME_LEN: usize = 3;

fn profile_key(username: &str) -> String {
    format!("user:{username}:profile")
}

fn sessions_key(username: &str) -> String {
    format!("user:{username}:sessions")
}

fn context_key(username: &str) -> String {
    format!("user:{username}:context")
}

/// Trims a login name and checks the minimum length.
pub fn normalize_username(raw: &str) -> Option<String> {
    let username = raw.trim();
    (username.chars().count() >= MIN_USERNAME_LEN).then(|| username.to_string())
}

#[derive(Clone)]
pub struct ProgressStore {
    store: Arc<dyn KeyValueStore>,
}

impl ProgressStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns the existing profile or creates and saves a fresh one.
    /// `username` must already be normalized. A profile that cannot be read
    /// because the backend failed is never overwritten.
    pub async fn login(&self, username: &str) -> UserProfile {
        match self.read_json::<UserProfile>(&profile_key(username)).await {
            Ok(Some(profile)) => {
                info!("User {username} logged in ({} sessions)", profile.total_sessions);
                profile
            }
            Ok(None) => {
                let profile = UserProfile::new(username);
                self.write_json(&profile_key(username), &profile).await;
                info!("Created profile for {username}");
                profile
            }
            Err(e) => {
                warn!("Persistence read failure for {username}'s profile: {e}; not saving a fresh one");
                UserProfile::new(username)
            }
        }
    }

    pub async fn find_profile(&self, username: &str) -> Option<UserProfile> {
        self.read_or_default(&profile_key(username)).await
    }

    /// Completed sessions, oldest first.
    pub async fn session_history(&self, username: &str) -> Vec<SessionRecord> {
        self.read_or_default::<Vec<SessionRecord>>(&sessions_key(username))
            .await
            .unwrap_or_default()
    }

    pub async fn load_context(&self, username: &str) -> InterviewContext {
        self.read_or_default::<InterviewContext>(&context_key(username))
            .await
            .unwrap_or_default()
    }

    pub async fn save_context(&self, username: &str, context: &InterviewContext) {
        if context.is_empty() {
            self.clear_context(username).await;
        } else {
            self.write_json(&context_key(username), context).await;
        }
    }

    pub async fn clear_context(&self, username: &str) {
        if let Err(e) = self.store.delete(&context_key(username)).await {
            warn!("Failed to clear context for {username}: {e}");
        }
    }

    /// Appends the record to the history and folds it into the profile.
    ///
    /// Each key is a separate read-modify-write. When the backend fails the
    /// read, that key is left untouched so stored history and totals are never
    /// replaced by a default. Returns the reconciled profile, whether or not
    /// the writes landed.
    pub async fn record_completed_session(
        &self,
        username: &str,
        record: &SessionRecord,
    ) -> UserProfile {
        match self.read_json::<Vec<SessionRecord>>(&sessions_key(username)).await {
            Ok(history) => {
                let mut history = history.unwrap_or_default();
                history.push(record.clone());
                self.write_json(&sessions_key(username), &history).await;
            }
            Err(e) => warn!(
                "Persistence read failure for {username}'s history: {e}; session {} not appended",
                record.id
            ),
        }

        let profile = match self.read_json::<UserProfile>(&profile_key(username)).await {
            Ok(stored) => {
                let mut profile = stored.unwrap_or_else(|| UserProfile::new(username));
                profile.record_session(record);
                self.write_json(&profile_key(username), &profile).await;
                profile
            }
            Err(e) => {
                warn!("Persistence read failure for {username}'s profile: {e}; totals not updated");
                let mut profile = UserProfile::new(username);
                profile.record_session(record);
                profile
            }
        };

        info!(
            "Recorded {} session for {username}: average {:.2}, best {:.2}, total {}",
            record.category, record.average_score, profile.best_score, profile.total_sessions
        );
        profile
    }

    /// `Ok(None)` for a missing key or malformed JSON, `Err` when the backend failed.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Persistence read failure for '{key}': malformed JSON ({e}), using defaults");
                Ok(None)
            }
        }
    }

    async fn read_or_default<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.read_json(key).await.unwrap_or_else(|e| {
            warn!("Persistence read failure for '{key}': {e}");
            None
        })
    }

    async fn write_json<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_write_json(key, value).await {
            warn!("Persistence write failure for '{key}': {e}");
        }
    }

    async fn try_write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), WriteError> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, &json).await?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
enum WriteError {
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::category::Category;
    use crate::interview::feedback::Feedback;
    use crate::models::QuestionResult;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    fn progress() -> (ProgressStore, Arc<MemoryStore>) {
        let memory = Arc::new(MemoryStore::new());
        (ProgressStore::new(memory.clone()), memory)
    }

    fn record(category: Category, scores: &[u8]) -> SessionRecord {
        let results: Vec<QuestionResult> = scores
            .iter()
            .enumerate()
            .map(|(i, &score)| QuestionResult {
                question: format!("Question {}", i + 1),
                answer: format!("Answer {}", i + 1),
                feedback: Feedback {
                    score,
                    overall: "Good".to_string(),
                    strengths: "s".to_string(),
                    improvements: "i".to_string(),
                    suggestions: "g".to_string(),
                },
                question_number: i as u32 + 1,
            })
            .collect();
        let average_score =
            crate::interview::feedback::average_score(results.iter().map(|r| r.feedback.score));
        SessionRecord {
            id: Uuid::new_v4(),
            date: Utc::now(),
            category,
            results,
            average_score,
        }
    }

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("  ada  ").as_deref(), Some("ada"));
        assert_eq!(normalize_username("al"), None);
        assert_eq!(normalize_username("   "), None);
    }

    #[tokio::test]
    async fn test_login_creates_profile_once() {
        let (progress, _) = progress();
        let first = progress.login("grace").await;
        assert_eq!(first, UserProfile::new("grace"));

        progress
            .record_completed_session("grace", &record(Category::Technical, &[8]))
            .await;
        let second = progress.login("grace").await;
        assert_eq!(second.total_sessions, 1);
    }

    #[tokio::test]
    async fn test_session_record_round_trips() {
        let (progress, _) = progress();
        let saved = record(Category::SystemDesign, &[4, 9, 7]);
        progress.record_completed_session("linus", &saved).await;

        let history = progress.session_history("linus").await;
        assert_eq!(history, vec![saved]);
    }

    #[tokio::test]
    async fn test_profile_aggregates_over_many_sessions() {
        let (progress, _) = progress();
        progress.login("barbara").await;
        let sessions = [
            record(Category::Technical, &[6, 7, 8, 9, 10]),
            record(Category::Behavioral, &[9, 9, 9, 9, 9]),
            record(Category::Technical, &[3, 3, 3, 3, 3]),
        ];
        for s in &sessions {
            progress.record_completed_session("barbara", s).await;
        }

        let profile = progress.find_profile("barbara").await.unwrap();
        assert_eq!(profile.total_sessions, 3);
        assert!((profile.best_score - 9.0).abs() < f64::EPSILON);
        assert_eq!(profile.categories_completed.len(), 2);
        assert_eq!(progress.session_history("barbara").await.len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_json_degrades_to_defaults() {
        let (progress, memory) = progress();
        memory.set("user:ken:profile", "{not json").await.unwrap();
        memory.set("user:ken:sessions", "[1, 2").await.unwrap();
        memory.set("user:ken:context", "42").await.unwrap();

        assert!(progress.find_profile("ken").await.is_none());
        assert!(progress.session_history("ken").await.is_empty());
        assert!(progress.load_context("ken").await.is_empty());

        // A completion after corruption starts history afresh.
        let profile = progress
            .record_completed_session("ken", &record(Category::Product, &[5]))
            .await;
        assert_eq!(profile.total_sessions, 1);
        assert_eq!(progress.session_history("ken").await.len(), 1);
    }

    #[tokio::test]
    async fn test_context_save_and_clear() {
        let (progress, memory) = progress();
        let ctx = InterviewContext::new(Some("Resume".to_string()), Some("JD".to_string()));
        progress.save_context("ada", &ctx).await;
        assert_eq!(progress.load_context("ada").await, ctx);

        progress
            .save_context("ada", &InterviewContext::default())
            .await;
        assert_eq!(memory.get("user:ada:context").await.unwrap(), None);
    }

    struct FailingStore;

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Database(sqlx::Error::PoolClosed))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Database(sqlx::Error::PoolClosed))
        }

        async fn delete(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Database(sqlx::Error::PoolClosed))
        }
    }

    /// Delegates to memory, failing the next `get` calls on demand.
    struct FlakyStore {
        inner: MemoryStore,
        failing_gets: AtomicUsize,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(),
                failing_gets: AtomicUsize::new(0),
            }
        }

        fn fail_next_gets(&self, count: usize) {
            self.failing_gets.store(count, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            let should_fail = self
                .failing_gets
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if should_fail {
                return Err(StorageError::Database(sqlx::Error::PoolTimedOut));
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.inner.set(key, value).await
        }

        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            self.inner.delete(key).await
        }
    }

    #[tokio::test]
    async fn test_transient_history_read_error_keeps_stored_history() {
        let flaky = Arc::new(FlakyStore::new());
        let progress = ProgressStore::new(flaky.clone());
        progress.login("margaret").await;
        for scores in [[6u8, 6], [7, 7], [9, 9]] {
            progress
                .record_completed_session("margaret", &record(Category::Technical, &scores))
                .await;
        }

        flaky.fail_next_gets(1);
        progress
            .record_completed_session("margaret", &record(Category::Product, &[5, 5]))
            .await;

        // The failed history read skips that append; nothing stored is lost.
        assert_eq!(progress.session_history("margaret").await.len(), 3);
        let profile = progress.find_profile("margaret").await.unwrap();
        assert_eq!(profile.total_sessions, 4);

        progress
            .record_completed_session("margaret", &record(Category::Leadership, &[4, 4]))
            .await;
        assert_eq!(progress.session_history("margaret").await.len(), 4);
    }

    #[tokio::test]
    async fn test_transient_profile_read_error_keeps_stored_totals() {
        let flaky = Arc::new(FlakyStore::new());
        let progress = ProgressStore::new(flaky.clone());
        progress.login("margaret").await;
        progress
            .record_completed_session("margaret", &record(Category::Technical, &[9, 9]))
            .await;

        progress
            .record_completed_session("margaret", &record(Category::Behavioral, &[8, 8]))
            .await;

        // Fails the history read and then the profile read.
        flaky.fail_next_gets(2);
        progress
            .record_completed_session("margaret", &record(Category::Product, &[2, 2]))
            .await;

        let profile = progress.find_profile("margaret").await.unwrap();
        assert_eq!(profile.total_sessions, 2);
        assert!((profile.best_score - 9.0).abs() < f64::EPSILON);
        assert_eq!(progress.session_history("margaret").await.len(), 2);
    }

    #[tokio::test]
    async fn test_login_read_error_does_not_reset_profile() {
        let flaky = Arc::new(FlakyStore::new());
        let progress = ProgressStore::new(flaky.clone());
        progress.login("margaret").await;
        progress
            .record_completed_session("margaret", &record(Category::Technical, &[7]))
            .await;

        flaky.fail_next_gets(1);
        progress.login("margaret").await;

        let profile = progress.find_profile("margaret").await.unwrap();
        assert_eq!(profile.total_sessions, 1);
    }

    #[tokio::test]
    async fn test_backend_failures_are_tolerated() {
        let progress = ProgressStore::new(Arc::new(FailingStore));
        let profile = progress.login("ada").await;
        assert_eq!(profile, UserProfile::new("ada"));

        let updated = progress
            .record_completed_session("ada", &record(Category::Leadership, &[7]))
            .await;
        assert_eq!(updated.total_sessions, 1);
        assert!(progress.session_history("ada").await.is_empty());
    }
}
