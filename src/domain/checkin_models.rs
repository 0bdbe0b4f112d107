use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An event that attendees can check in to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    // ---
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// The outstanding rotating check-in credential for one event.
///
/// There is at most one of these per `event_id`. The stored `expires_at`
/// always equals the `exp` claim signed into `token`, so validity can be
/// decided without parsing the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    // ---
    /// Event this credential authorizes check-in for (unique key)
    pub event_id: i32,

    /// Compact signed token, rendered as the QR payload
    pub token: String,

    /// Instant after which the credential is no longer valid
    pub expires_at: DateTime<Utc>,

    /// Subject who requested issuance
    pub issuer_id: String,
}

impl Credential {
    // ---
    /// A credential is valid strictly before its expiry instant.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        // ---
        now < self.expires_at
    }
}
