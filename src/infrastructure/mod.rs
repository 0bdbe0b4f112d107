mod database;
pub mod metrics;
mod sessions;

// Re-export the factory functions for easy access
pub use database::{
    connect_with_retry, create_memory_repository, create_postgres_repository, MemoryRepository,
};
pub use metrics::{create_noop_metrics, create_prom_metrics};
pub use sessions::{
    create_memory_sessions, create_redis_sessions, MemorySessionStore, RedisSessionStore,
};
