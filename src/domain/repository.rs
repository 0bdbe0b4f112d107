use super::checkin_models::{Credential, Event};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Abstraction for event and check-in credential persistence.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    // ---
    /// Create a new event.
    async fn create_event(&self, name: &str) -> Result<Event>;

    /// Check whether an event exists.
    async fn event_exists(&self, event_id: i32) -> Result<bool>;

    /// Get the stored credential for an event, valid or not.
    async fn find_credential(&self, event_id: i32) -> Result<Option<Credential>>;

    /// Delete the stored credential for an event.
    ///
    /// Returns `true` if a record was removed.
    async fn delete_credential(&self, event_id: i32) -> Result<bool>;

    /// Store `candidate` unless a credential valid at `now` already exists.
    ///
    /// Inserts when no record exists and replaces an expired one, as a
    /// single atomic step keyed by `event_id`. Returns the stored record,
    /// or `None` if a still-valid record was left in place.
    async fn upsert_credential_unless_valid(
        &self,
        candidate: &Credential,
        now: DateTime<Utc>,
    ) -> Result<Option<Credential>>;

    /// Round-trip to the backing store, for health checks.
    async fn ping(&self) -> Result<()>;
}

/// Type alias for any backend that implements Repository.
pub type RepositoryPtr = Arc<dyn Repository>;
