//! Redis-backed session lookup.
//!
//! Sessions are stored as JSON under `session:{token}` with a TTL.

use crate::domain::{SessionInfo, SessionStore};
use anyhow::Result;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

// ---

/// Session data stored in Redis.
#[derive(Debug, Serialize, Deserialize)]
struct SessionData {
    //
    user_id: String,
    username: String,
    expires_at: i64,
}

// ---

/// Creates a Redis session store.
///
/// # Errors
/// Fails if the URL cannot be parsed. No connection is opened until the
/// first request.
pub fn create_redis_sessions(url: &str, ttl: Duration) -> Result<RedisSessionStore> {
    // ---
    let client = Client::open(url)?;
    Ok(RedisSessionStore { client, ttl })
}

pub struct RedisSessionStore {
    // ---
    client: Client,
    ttl: Duration,
}

impl RedisSessionStore {
    // ---
    /// Creates a new multiplexed Redis connection.
    async fn get_conn(&self) -> Result<MultiplexedConnection> {
        // ---
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|err| {
                tracing::error!("Failed to connect to Redis: {:?}", err);
                err.into()
            })
    }

    /// Writes a session in the layout the login flow uses.
    ///
    /// Logging in is not part of this service; this lets embedders and
    /// tests seed a session.
    pub async fn create_session(&self, user_id: &str, username: &str) -> Result<String> {
        // ---
        let token = Uuid::new_v4().to_string();
        let ttl_secs = self.ttl.as_secs().max(1);
        let expires_at = chrono::Utc::now().timestamp() + i64::try_from(ttl_secs)?;

        let session_data = SessionData {
            //
            user_id: user_id.to_string(),
            username: username.to_string(),
            expires_at,
        };

        let session_json = serde_json::to_string(&session_data)?;

        let mut conn = self.get_conn().await?;
        conn.set_ex::<_, _, ()>(redis_key(&token), session_json, ttl_secs)
            .await
            .map_err(|e| {
                //
                tracing::error!("Failed to store session in Redis: {}", e);
                e
            })?;

        tracing::info!("Created session for user: {}", username);

        Ok(token)
    }
}

fn redis_key(token: &str) -> String {
    format!("session:{token}")
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    // ---
    async fn validate_session(&self, token: &str) -> Result<Option<SessionInfo>> {
        // ---
        let mut conn = self.get_conn().await?;

        let session_json: Option<String> = conn.get(redis_key(token)).await?;
        let Some(session_json) = session_json else {
            tracing::debug!("Session not found");
            return Ok(None);
        };

        let session_data: SessionData = serde_json::from_str(&session_json)?;

        // Redis TTL should have removed it, but don't trust clocks blindly.
        if session_data.expires_at <= chrono::Utc::now().timestamp() {
            tracing::debug!("Session expired for user: {}", session_data.username);
            return Ok(None);
        }

        Ok(Some(SessionInfo {
            user_id: session_data.user_id,
            username: session_data.username,
        }))
    }

    async fn ping(&self) -> Result<()> {
        // ---
        let mut conn = self.get_conn().await?;
        let _: String = conn.ping().await?;
        Ok(())
    }
}
