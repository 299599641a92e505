// Session management for concurrent HTTP clients

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tokio::time;

use crate::chat::ConversationSession;

/// A session shared between requests; the mutex serializes its turns
pub type SharedSession = Arc<Mutex<ConversationSession>>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Maximum session limit reached ({active}/{max})")]
    LimitReached { active: usize, max: usize },

    #[error("Session not found: {0}")]
    NotFound(String),
}

/// Concurrent session manager using DashMap
pub struct SessionManager {
    /// Active sessions (thread-safe concurrent HashMap)
    sessions: Arc<DashMap<String, SharedSession>>,
    /// Maximum number of concurrent sessions
    max_sessions: usize,
    /// Session timeout in minutes
    timeout_minutes: u64,
    /// History bound for newly created sessions
    max_history: usize,
}

impl SessionManager {
    /// Create a new session manager
    ///
    /// Expired sessions are only removed once `start_cleanup_task` runs or
    /// `cleanup_expired` is called.
    pub fn new(max_sessions: usize, timeout_minutes: u64, max_history: usize) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            max_sessions,
            timeout_minutes,
            max_history,
        }
    }

    /// Get an existing session, or create one when `session_id` is absent or unknown
    pub fn get_or_create(&self, session_id: Option<&str>) -> Result<SharedSession, SessionError> {
        if let Some(id) = session_id {
            if let Some(session) = self.get(id) {
                return Ok(session);
            }
            tracing::debug!(session_id = %id, "Unknown session id, creating a new session");
        }

        let active = self.sessions.len();
        if active >= self.max_sessions {
            return Err(SessionError::LimitReached {
                active,
                max: self.max_sessions,
            });
        }

        let session = ConversationSession::new(self.max_history);
        let id = session.id().to_string();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.insert(id.clone(), Arc::clone(&shared));

        tracing::info!(session_id = %id, "Created new session");
        Ok(shared)
    }

    /// Lock a session for one turn, creating it like `get_or_create`
    ///
    /// A session swept by cleanup while we waited for its lock is no longer
    /// reachable by id, so the lookup is repeated until the locked session is
    /// still registered. The session is touched before the guard is returned.
    pub async fn checkout(
        &self,
        session_id: Option<&str>,
    ) -> Result<OwnedMutexGuard<ConversationSession>, SessionError> {
        loop {
            let shared = self.get_or_create(session_id)?;
            let mut session = Arc::clone(&shared).lock_owned().await;

            let registered = self
                .sessions
                .get(session.id())
                .map_or(false, |entry| Arc::ptr_eq(entry.value(), &shared));
            if registered {
                session.touch();
                return Ok(session);
            }

            tracing::debug!(session_id = %session.id(), "Session removed while waiting for its lock");
        }
    }

    pub fn get(&self, session_id: &str) -> Option<SharedSession> {
        self.sessions
            .get(session_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Look up a session, failing when it does not exist
    pub fn require(&self, session_id: &str) -> Result<SharedSession, SessionError> {
        self.get(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    /// Delete a session
    pub fn delete(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            tracing::info!(session_id = %session_id, "Deleted session");
        }
        removed
    }

    /// Get active session count
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    /// Remove expired sessions, returning how many were removed
    pub fn cleanup_expired(&self) -> usize {
        remove_expired(&self.sessions, self.timeout_minutes)
    }

    /// Start background cleanup task
    pub fn start_cleanup_task(&self, interval: Duration) -> JoinHandle<()> {
        let sessions = Arc::clone(&self.sessions);
        let timeout_minutes = self.timeout_minutes;

        tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            loop {
                ticker.tick().await;
                remove_expired(&sessions, timeout_minutes);
            }
        })
    }
}

/// Sessions busy with a turn are never considered expired
fn remove_expired(sessions: &DashMap<String, SharedSession>, timeout_minutes: u64) -> usize {
    let mut removed_count = 0;
    // retain holds each shard's write lock, so a lookup cannot interleave with the check
    sessions.retain(|session_id, session| {
        let expired = session
            .try_lock()
            .map(|session| session.is_expired(timeout_minutes))
            .unwrap_or(false);
        if expired {
            removed_count += 1;
            tracing::debug!(session_id = %session_id, "Removed expired session");
        }
        !expired
    });

    if removed_count > 0 {
        tracing::info!(
            removed = removed_count,
            active = sessions.len(),
            "Cleaned up expired sessions"
        );
    }
    removed_count
}
