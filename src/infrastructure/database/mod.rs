//! Persistence backends for events and check-in credentials.
//!
//! PostgreSQL is the production store. The in-memory store gives the same
//! atomicity guarantees and is used for embedding and tests.

mod memory_repository;
mod postgres_repository;


use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

pub use memory_repository::{create_memory_repository, MemoryRepository};
pub use postgres_repository::create_postgres_repository;

/// Delay between connection attempts while the database comes up.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Connects to PostgreSQL, retrying while the server is unavailable, and
/// applies pending migrations.
///
/// # Errors
/// Returns the last connection error once `retry_count` attempts are
/// exhausted, or any migration failure.
pub async fn connect_with_retry(config: &DatabaseConfig) -> Result<PgPool> {
    // ---
    let attempts = config.retry_count.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        // ---
        let result = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await;

        match result {
            Ok(pool) => {
                tracing::info!("Connected to database after {} attempt(s)", attempt);

                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("Failed to run database migrations")?;

                return Ok(pool);
            }
            Err(err) => {
                tracing::warn!("Database connection attempt {}/{} failed: {}", attempt, attempts, err);
                last_error = Some(err);
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }

    Err(match last_error {
        Some(err) => anyhow::Error::new(err).context("Failed to connect to database"),
        None => anyhow::anyhow!("Failed to connect to database"),
    })
}
