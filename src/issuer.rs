//! Rotating check-in credential issuance.
//!
//! Each event has at most one outstanding credential. A caller polling for
//! the current credential gets the stored one while it is still valid, and
//! a freshly signed one once it has expired. Expiry is detected lazily on
//! the next request; nothing sweeps old records.

use crate::domain::{ClockPtr, Credential, MetricsPtr, RepositoryPtr};
use crate::token::{CheckinClaims, TokenSigner};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

// ---

/// Store attempts before giving up on a contended event.
const MAX_STORE_ATTEMPTS: usize = 2;

// ---

/// Failures while getting or issuing a credential.
#[derive(Debug, Error)]
pub enum IssueError {
    // ---
    #[error("a requesting subject is required")]
    MissingSubject,

    #[error("failed to sign credential: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("persistence error: {0}")]
    Persistence(#[from] anyhow::Error),

    #[error("credential for event {0} kept changing during issuance")]
    Contention(i32),

    #[error("issuance time {0} is out of range")]
    TimeOutOfRange(i64),
}

// ---

/// Hands out the current rotating credential for an event.
///
/// Built once at startup from explicit configuration and shared by all
/// request handlers.
pub struct CredentialIssuer {
    // ---
    repository: RepositoryPtr,
    signer: Arc<TokenSigner>,
    clock: ClockPtr,
    metrics: MetricsPtr,
    validity_secs: i64,
}

impl CredentialIssuer {
    // ---
    /// Creates an issuer.
    ///
    /// # Errors
    /// Fails if `validity_window` is shorter than one second.
    pub fn new(
        repository: RepositoryPtr,
        signer: Arc<TokenSigner>,
        clock: ClockPtr,
        metrics: MetricsPtr,
        validity_window: Duration,
    ) -> anyhow::Result<Self> {
        // ---
        let validity_secs = i64::try_from(validity_window.as_secs())?;
        if validity_secs < 1 {
            anyhow::bail!("credential validity window must be at least one second");
        }

        Ok(Self {
            repository,
            signer,
            clock,
            metrics,
            validity_secs,
        })
    }

    /// The signer shared with check-in verification.
    pub fn signer(&self) -> &TokenSigner {
        // ---
        &self.signer
    }

    /// Current time according to the issuer's clock.
    pub fn now(&self) -> DateTime<Utc> {
        // ---
        self.clock.now()
    }

    /// Returns the valid credential for `event_id`, issuing one if needed.
    ///
    /// A still-valid stored credential is returned unchanged. Otherwise a
    /// new token is signed for `subject_id` and stored in place of any
    /// expired record. If another request stores a valid credential first,
    /// that one is returned instead.
    ///
    /// The caller is responsible for checking that the event exists.
    ///
    /// # Errors
    /// - [`IssueError::MissingSubject`] if `subject_id` is empty; the
    ///   repository is not touched in that case.
    /// - [`IssueError::Signing`] / [`IssueError::Persistence`] for backend
    ///   failures. These are not retried.
    /// - [`IssueError::Contention`] if the stored record keeps changing
    ///   underneath us for every attempt.
    #[tracing::instrument(skip(self))]
    pub async fn get_or_issue(
        &self,
        event_id: i32,
        subject_id: &str,
    ) -> Result<Credential, IssueError> {
        // ---
        if subject_id.is_empty() {
            return Err(IssueError::MissingSubject);
        }

        let start = Instant::now();

        for _ in 0..MAX_STORE_ATTEMPTS {
            let now = self.clock.now();

            if let Some(existing) = self.repository.find_credential(event_id).await? {
                if existing.is_valid_at(now) {
                    tracing::debug!("Reusing credential for event {}", event_id);
                    self.metrics.record_credential_reused();
                    self.metrics.record_issue_duration(start);
                    return Ok(existing);
                }
                tracing::debug!(
                    "Credential for event {} expired at {}, rotating",
                    event_id,
                    existing.expires_at
                );
            }

            let candidate = self.mint(event_id, subject_id, now)?;

            match self
                .repository
                .upsert_credential_unless_valid(&candidate, now)
                .await?
            {
                Some(stored) => {
                    tracing::info!(
                        "Issued credential for event {} (expires {})",
                        event_id,
                        stored.expires_at
                    );
                    self.metrics.record_credential_issued();
                    self.metrics.record_issue_duration(start);
                    return Ok(stored);
                }
                None => {
                    // Someone else stored a valid one between our read and write.
                    tracing::debug!("Lost issuance race for event {}, re-reading", event_id);
                }
            }
        }

        tracing::warn!("Gave up issuing credential for event {}", event_id);
        Err(IssueError::Contention(event_id))
    }

    /// Signs a new credential valid from `now` for the configured window.
    ///
    /// Issuance time is truncated to whole seconds so that the stored
    /// `expires_at` is exactly the signed `exp`.
    fn mint(
        &self,
        event_id: i32,
        subject_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Credential, IssueError> {
        // ---
        let iat = now.timestamp();
        let exp = iat
            .checked_add(self.validity_secs)
            .ok_or(IssueError::TimeOutOfRange(iat))?;

        let expires_at =
            DateTime::<Utc>::from_timestamp(exp, 0).ok_or(IssueError::TimeOutOfRange(exp))?;

        let claims = CheckinClaims {
            sub: subject_id.to_string(),
            event_id,
            iat,
            exp,
            jti: Uuid::new_v4().to_string(),
        };

        let token = self.signer.sign(&claims)?;

        Ok(Credential {
            event_id,
            token,
            expires_at,
            issuer_id: subject_id.to_string(),
        })
    }
}
