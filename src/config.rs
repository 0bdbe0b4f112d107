// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Configuration is validated eagerly and failures are treated as
//! deployment errors rather than recoverable runtime conditions.

use anyhow::Result;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads a required environment variable.
///
/// # Behavior
/// - Fails fast if the variable is missing or empty
/// - Produces a clear, human-readable error message
/// - Intended for startup-time configuration validation
///
/// Missing configuration is treated as a deployment error,
/// not a recoverable runtime condition.
macro_rules! required_env {
    // ---
    ($key:literal) => {
        std::env::var($key)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow::anyhow!(concat!("Missing required configuration: ", $key)))?
    };
}

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. This macro is appropriate for non-critical
/// tuning parameters where fallback behavior is acceptable.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails due to a missing
/// required environment variable.
///
/// This macro is intended for config unit tests only and enforces
/// consistent error messages across failure cases.
macro_rules! assert_missing_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Missing required configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
/// It is built once in `create_router()` and the pieces are handed to
/// the components that need them; nothing reads the environment later.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: database::DatabaseConfig,
    pub redis: redis::RedisConfig,
    pub checkin: checkin::CheckinConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any required configuration is missing or invalid.
    /// This function is intended to be called exactly once at startup.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            database: database::DatabaseConfig::from_env()?,
            redis: redis::RedisConfig::from_env()?,
            checkin: checkin::CheckinConfig::from_env()?,
        })
    }
}

// ============================================================
// Database configuration
// ============================================================

mod database {
    // ---
    use super::*;

    /// Database-related configuration derived from environment variables.
    ///
    /// This configuration is required for the service to function and
    /// is validated eagerly during startup.
    #[derive(Debug, Clone)]
    pub struct DatabaseConfig {
        /// PostgreSQL connection string.
        pub database_url: String,

        /// Number of retry attempts when initializing the database connection. Defaults to 50.
        pub retry_count: u32,

        /// Maximum time to wait when acquiring a connection from the pool. Defaults to 30 seconds.
        pub acquire_timeout: Duration,

        /// Minimum number of connections to keep in the pool, even when idle. Defaults to 2.
        pub min_connections: u32,

        /// Maximum number of connections to be open concurrently. Defaults to 15
        pub max_connections: u32,
    }

    impl DatabaseConfig {
        /// Builds a [`DatabaseConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if required configuration is missing.
        pub fn from_env() -> Result<Self> {
            // ---
            let database_url = required_env!("DATABASE_URL");
            let retry_count = optional_env_parse!("AXUM_DB_RETRY_COUNT", u32, 50);
            let acquire_timeout_secs = optional_env_parse!("AXUM_DB_ACQUIRE_TIMEOUT_SEC", u64, 30);
            let min_connections = optional_env_parse!("AXUM_DB_MIN_CONNECTIONS", u32, 2);
            let max_connections = optional_env_parse!("AXUM_DB_MAX_CONNECTIONS", u32, 15);

            Ok(Self {
                database_url,
                retry_count,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
                min_connections,
                max_connections,
            })
        }
    }
}
pub use database::DatabaseConfig;

// ============================================================
// Redis configuration
// ============================================================

mod redis {
    // ---
    use super::*;

    /// Redis-related configuration used for session lookup.
    #[derive(Debug, Clone)]
    pub struct RedisConfig {
        /// Redis connection string.
        pub url: String,

        /// Time-to-live for session records.
        pub session_ttl: Duration,
    }

    impl RedisConfig {
        /// Builds a [`RedisConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if required configuration is missing.
        pub fn from_env() -> Result<Self> {
            // ---
            let url = required_env!("AXUM_REDIS_URL");

            let ttl_secs = optional_env_parse!("AXUM_SESSION_TTL_SEC", u64, 604_800);

            Ok(Self {
                url,
                session_ttl: Duration::from_secs(ttl_secs),
            })
        }
    }
}
pub use redis::RedisConfig;

// ============================================================
// Check-in credential configuration
// ============================================================

mod checkin {
    // ---
    use super::*;

    /// Default lifetime of a rotating check-in credential.
    pub const DEFAULT_VALIDITY_WINDOW: Duration = Duration::from_secs(30);

    /// Signing and rotation settings for check-in credentials.
    ///
    /// The signing secret is security-critical and has no default.
    #[derive(Clone)]
    pub struct CheckinConfig {
        /// HMAC secret used to sign and verify credentials.
        pub signing_secret: String,

        /// How long a freshly issued credential stays valid.
        pub validity_window: Duration,
    }

    // Keep the secret out of debug output.
    impl std::fmt::Debug for CheckinConfig {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            // ---
            f.debug_struct("CheckinConfig")
                .field("signing_secret", &"<redacted>")
                .field("validity_window", &self.validity_window)
                .finish()
        }
    }

    impl CheckinConfig {
        /// Builds a [`CheckinConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if the signing secret is missing, or the
        /// validity window is set but is not a positive whole number of seconds.
        pub fn from_env() -> Result<Self> {
            // ---
            let signing_secret = required_env!("CHECKIN_SIGNING_SECRET");
            // Unlike the tuning knobs, a window that does not parse is an error.
            let window_secs = match std::env::var("CHECKIN_VALIDITY_WINDOW_SEC") {
                Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                    anyhow::anyhow!(
                        "Invalid configuration: CHECKIN_VALIDITY_WINDOW_SEC must be whole seconds, got {raw:?}"
                    )
                })?,
                Err(_) => DEFAULT_VALIDITY_WINDOW.as_secs(),
            };

            if window_secs == 0 {
                anyhow::bail!("Invalid configuration: CHECKIN_VALIDITY_WINDOW_SEC must be at least 1");
            }

            Ok(Self {
                signing_secret,
                validity_window: Duration::from_secs(window_secs),
            })
        }
    }
}
pub use checkin::{CheckinConfig, DEFAULT_VALIDITY_WINDOW};

// ============================================================
// Tests
// ============================================================
