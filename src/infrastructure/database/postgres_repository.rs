use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Credential, Event, Repository};

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i32,
    name: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    event_id: i32,
    token: String,
    expires_at: DateTime<Utc>,
    issuer_id: String,
}

impl From<CredentialRow> for Credential {
    fn from(r: CredentialRow) -> Self {
        // ---
        Credential {
            event_id: r.event_id,
            token: r.token,
            expires_at: r.expires_at,
            issuer_id: r.issuer_id,
        }
    }
}

pub fn create_postgres_repository(pool: PgPool) -> impl Repository {
    // ---
    PostgresRepository::new(pool)
}

pub struct PostgresRepository {
    // ---
    pool: PgPool,
}

impl PostgresRepository {
    // ---
    pub fn new(pool: PgPool) -> Self {
        // ---
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Repository for PostgresRepository {
    // ---
    async fn create_event(&self, name: &str) -> Result<Event> {
        // ---
        let row = sqlx::query_as::<_, EventRow>(
            "INSERT INTO events (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(Event {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        })
    }

    async fn event_exists(&self, event_id: i32) -> Result<bool> {
        // ---
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM events WHERE id = $1)")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn find_credential(&self, event_id: i32) -> Result<Option<Credential>> {
        // ---
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT event_id, token, expires_at, issuer_id
             FROM checkin_credentials WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Credential::from))
    }

    async fn delete_credential(&self, event_id: i32) -> Result<bool> {
        // ---
        let result = sqlx::query("DELETE FROM checkin_credentials WHERE event_id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn upsert_credential_unless_valid(
        &self,
        candidate: &Credential,
        now: DateTime<Utc>,
    ) -> Result<Option<Credential>> {
        // ---
        // The WHERE on the conflict branch leaves a still-valid row untouched,
        // in which case RETURNING yields nothing.
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            INSERT INTO checkin_credentials (event_id, token, expires_at, issuer_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (event_id) DO UPDATE
            SET token = EXCLUDED.token,
                expires_at = EXCLUDED.expires_at,
                issuer_id = EXCLUDED.issuer_id,
                issued_at = NOW()
            WHERE checkin_credentials.expires_at <= $5
            RETURNING event_id, token, expires_at, issuer_id
            "#,
        )
        .bind(candidate.event_id)
        .bind(&candidate.token)
        .bind(candidate.expires_at)
        .bind(&candidate.issuer_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Credential::from))
    }

    async fn ping(&self) -> Result<()> {
        // ---
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
