use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::interview::coach::InterviewCoach;
use crate::interview::session::{SessionConfig, SessionController};
use crate::storage::ProgressStore;

/// Sessions untouched for this long are dropped by the sweeper.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

/// How often the sweeper looks for idle sessions.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

struct Entry {
    controller: Arc<Mutex<SessionController>>,
    last_used: Instant,
}

/// Live sessions keyed by username. Each controller sits behind its own lock,
/// so one user's calls are serialised while different users run concurrently.
///
/// Idle controllers are evicted; an evicted user starts again from Idle.
/// Completed sessions are already persisted, so only unfinished work is lost.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Entry>>,
    coach: Arc<dyn InterviewCoach>,
    progress: ProgressStore,
    config: SessionConfig,
}

impl SessionRegistry {
    pub fn new(coach: Arc<dyn InterviewCoach>, progress: ProgressStore, config: SessionConfig) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            coach,
            progress,
            config,
        }
    }

    /// Returns the user's controller, creating an idle one on first use.
    pub async fn session(&self, username: &str) -> Arc<Mutex<SessionController>> {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.entry(username.to_string()).or_insert_with(|| {
            debug!("Opening session controller for {username}");
            Entry {
                controller: Arc::new(Mutex::new(SessionController::new(
                    username,
                    self.config,
                    self.coach.clone(),
                    self.progress.clone(),
                ))),
                last_used: Instant::now(),
            }
        });
        entry.last_used = Instant::now();
        entry.controller.clone()
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Drops controllers idle for at least `max_idle`. A controller still held
    /// by an in-flight request is kept. Returns how many were dropped.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, entry| {
            Arc::strong_count(&entry.controller) > 1
                || now.duration_since(entry.last_used) < max_idle
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {evicted} idle session(s), {} remain", sessions.len());
        }
        evicted
    }

    /// Runs [`evict_idle`](Self::evict_idle) every `every` until the runtime shuts down.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration, max_idle: Duration) {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                registry.evict_idle(max_idle).await;
            }
        });
    }
}
