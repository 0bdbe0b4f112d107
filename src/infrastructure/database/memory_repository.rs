use anyhow::Result;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::domain::{Credential, Event, Repository};

pub fn create_memory_repository() -> MemoryRepository {
    // ---
    MemoryRepository::new()
}

/// Process-local repository.
///
/// Per-key entry locking gives the same insert-or-replace-if-expired
/// atomicity as the PostgreSQL `ON CONFLICT` statement. Credentials
/// referencing unknown events are refused, mirroring the foreign key.
#[derive(Debug)]
pub struct MemoryRepository {
    // ---
    events: DashMap<i32, Event>,
    credentials: DashMap<i32, Credential>,
    next_event_id: AtomicI32,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRepository {
    // ---
    pub fn new() -> Self {
        // ---
        Self {
            events: DashMap::new(),
            credentials: DashMap::new(),
            next_event_id: AtomicI32::new(1),
        }
    }

    /// Registers an event under a caller-chosen id.
    pub fn insert_event(&self, event_id: i32, name: &str) -> Event {
        // ---
        let event = Event {
            id: event_id,
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.events.insert(event_id, event.clone());
        self.next_event_id.fetch_max(event_id.saturating_add(1), Ordering::SeqCst);
        event
    }

    /// Number of stored credentials.
    pub fn credential_count(&self) -> usize {
        // ---
        self.credentials.len()
    }
}

#[async_trait::async_trait]
impl Repository for MemoryRepository {
    // ---
    async fn create_event(&self, name: &str) -> Result<Event> {
        // ---
        let id = self.next_event_id.fetch_add(1, Ordering::SeqCst);
        Ok(self.insert_event(id, name))
    }

    async fn event_exists(&self, event_id: i32) -> Result<bool> {
        // ---
        Ok(self.events.contains_key(&event_id))
    }

    async fn find_credential(&self, event_id: i32) -> Result<Option<Credential>> {
        // ---
        Ok(self.credentials.get(&event_id).map(|c| c.value().clone()))
    }

    async fn delete_credential(&self, event_id: i32) -> Result<bool> {
        // ---
        Ok(self.credentials.remove(&event_id).is_some())
    }

    async fn upsert_credential_unless_valid(
        &self,
        candidate: &Credential,
        now: DateTime<Utc>,
    ) -> Result<Option<Credential>> {
        // ---
        if !self.events.contains_key(&candidate.event_id) {
            anyhow::bail!(
                "credential references unknown event {}",
                candidate.event_id
            );
        }

        match self.credentials.entry(candidate.event_id) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_valid_at(now) {
                    return Ok(None);
                }
                occupied.insert(candidate.clone());
            }
            Entry::Vacant(vacant) => {
                vacant.insert(candidate.clone());
            }
        }

        Ok(Some(candidate.clone()))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
