//! Session store backends.

mod memory_sessions;
mod redis_sessions;

pub use memory_sessions::{create_memory_sessions, MemorySessionStore};
pub use redis_sessions::{create_redis_sessions, RedisSessionStore};
