use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Authenticated caller resolved from a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    // ---
    /// Subject identifier, used as the signed subject and the audit issuer.
    pub user_id: String,
    pub username: String,
}

/// Abstraction over where login sessions live.
///
/// Sessions are created by the login flow elsewhere; this service only
/// needs to resolve a bearer token to a subject.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    // ---
    /// Resolve a bearer token. Unknown or expired tokens yield `None`.
    async fn validate_session(&self, token: &str) -> Result<Option<SessionInfo>>;

    /// Round-trip to the backing store, for health checks.
    async fn ping(&self) -> Result<()>;
}

/// Type alias for any backend that implements SessionStore.
pub type SessionStorePtr = Arc<dyn SessionStore>;
