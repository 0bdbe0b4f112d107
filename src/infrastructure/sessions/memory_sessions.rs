use crate::domain::{SessionInfo, SessionStore};
use anyhow::Result;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Duration;
use uuid::Uuid;

pub fn create_memory_sessions(ttl: Duration) -> MemorySessionStore {
    // ---
    MemorySessionStore {
        sessions: DashMap::new(),
        ttl,
    }
}

/// Process-local session store.
#[derive(Debug)]
pub struct MemorySessionStore {
    // ---
    sessions: DashMap<String, (SessionInfo, DateTime<Utc>)>,
    ttl: Duration,
}

impl MemorySessionStore {
    // ---
    /// Seeds a session for `user_id` and returns its bearer token.
    ///
    /// Logging in is not part of this service; this exists so embedders
    /// and tests can stand in for the login flow.
    pub async fn create_session(&self, user_id: &str, username: &str) -> Result<String> {
        // ---
        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + chrono::Duration::from_std(self.ttl)?;

        let info = SessionInfo {
            user_id: user_id.to_string(),
            username: username.to_string(),
        };
        self.sessions.insert(token.clone(), (info, expires_at));

        Ok(token)
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    // ---
    async fn validate_session(&self, token: &str) -> Result<Option<SessionInfo>> {
        // ---
        let now = Utc::now();

        // Expired sessions are dropped on sight.
        let removed = self
            .sessions
            .remove_if(token, |_, (_, expires_at)| *expires_at <= now);
        if removed.is_some() {
            return Ok(None);
        }

        Ok(self.sessions.get(token).map(|entry| entry.value().0.clone()))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
