//! Application state management.
//!
//! This module defines the shared state structure that gets passed to all
//! Axum handlers via the `State` extractor. The state is cheaply cloneable
//! (every field is an `Arc`) so each request gets its own copy without
//! duplicating the underlying resources.

use crate::domain::{MetricsPtr, RepositoryPtr, SessionStorePtr};
use crate::issuer::CredentialIssuer;
use std::sync::Arc;

/// Shared application state passed to all Axum handlers.
///
/// This struct serves as the Dependency Injection container for the application.
///
/// # Design Principles
///
/// - **Dependency Inversion**: Handlers depend on abstractions (`Repository`,
///   `SessionStore`), not concrete PostgreSQL or Redis types.
/// - **Immutable After Initialization**: State is built once at startup and
///   never mutated.
///
/// # Lifecycle
///
/// 1. Created once in `create_router()` (or by tests via [`AppState::new`])
/// 2. Attached to the Axum router via `.with_state(app_state)`
/// 3. Cloned automatically by Axum for each incoming HTTP request
#[derive(Clone)]
pub struct AppState {
    /// Session lookup for bearer tokens.
    sessions: SessionStorePtr,

    /// Metrics implementation for recording application events.
    metrics: MetricsPtr,

    /// Events and credential records.
    repository: RepositoryPtr,

    /// Rotating credential issuer. Shares `repository` and `metrics`.
    issuer: Arc<CredentialIssuer>,
}

impl AppState {
    // ---

    pub fn new(
        sessions: SessionStorePtr,
        metrics: MetricsPtr,
        repository: RepositoryPtr,
        issuer: Arc<CredentialIssuer>,
    ) -> Self {
        // ---
        AppState {
            sessions,
            metrics,
            repository,
            issuer,
        }
    }

    /// Get a reference to the session store.
    pub(crate) fn sessions(&self) -> &SessionStorePtr {
        // ---
        &self.sessions
    }

    /// Get a reference to the metrics implementation.
    pub(crate) fn metrics(&self) -> &MetricsPtr {
        // ---
        &self.metrics
    }

    /// Get a reference to the repository implementation.
    pub(crate) fn repository(&self) -> &RepositoryPtr {
        // ---
        &self.repository
    }

    /// Get a reference to the credential issuer.
    pub(crate) fn issuer(&self) -> &CredentialIssuer {
        // ---
        &self.issuer
    }
}
