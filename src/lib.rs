// src/lib.rs
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};

use handlers::*;
use std::env;
use std::sync::Arc;

// Public exports (visible outside this module)
pub mod domain;

// Internal-only exports (sibling access within this module)
mod app_state;
mod config;
mod handlers;
mod infrastructure;
mod issuer;
mod token;

// Hoist up only the public symbol(s)
pub use app_state::AppState;
pub use issuer::{CredentialIssuer, IssueError};
pub use token::{CheckinClaims, TokenError, TokenSigner};

pub use config::*;

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    connect_with_retry, // ---
    create_memory_repository,
    create_memory_sessions,
    create_noop_metrics,
    create_postgres_repository,
    create_prom_metrics,
    create_redis_sessions,
    MemoryRepository,
    MemorySessionStore,
    RedisSessionStore,
};

/// Build the HTTP router from environment configuration.
///
/// Connects to PostgreSQL (running migrations) and prepares the Redis
/// session store. The metrics backend is chosen by `AXUM_METRICS_TYPE`.
pub async fn create_router() -> Result<Router> {
    // ---
    tracing_subscriber::fmt::try_init().ok(); // Ignores if already initialized

    // Load all configuration from environment
    let config = AppConfig::from_env()?;
    tracing::debug!("Check-in settings: {:?}", config.checkin);

    // Determine metrics implementation from environment
    let metrics_type = env::var("AXUM_METRICS_TYPE").unwrap_or_else(|_| "noop".to_string());
    let metrics = if metrics_type == "prom" {
        create_prom_metrics()?
    } else {
        create_noop_metrics()?
    };

    // Create infrastructure dependencies
    let sessions = Arc::new(create_redis_sessions(
        &config.redis.url,
        config.redis.session_ttl,
    )?);
    let pool = connect_with_retry(&config.database).await?;
    let repository: domain::RepositoryPtr = Arc::new(create_postgres_repository(pool));

    let signer = Arc::new(TokenSigner::new(&config.checkin.signing_secret)?);
    let issuer = CredentialIssuer::new(
        repository.clone(),
        signer,
        Arc::new(domain::SystemClock),
        metrics.clone(),
        config.checkin.validity_window,
    )?;

    // Build application state with all dependencies
    let app_state = AppState::new(sessions, metrics, repository, Arc::new(issuer));

    Ok(build_router(app_state))
}

/// Build the HTTP router around an already assembled [`AppState`].
pub fn build_router(app_state: AppState) -> Router {
    // ---
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .nest(
            "/events",
            Router::new()
                .route("/", post(create_event))
                .route(
                    "/{event_id}/credential",
                    get(get_credential).delete(revoke_credential),
                )
                .route("/{event_id}/checkin", post(verify_checkin)),
        )
        .with_state(app_state)
}
