mod memory;
mod redis_store;

pub use memory::InMemoryRateLimitStore;
pub use redis_store::RedisRateLimitStore;

use crate::domain::{RateLimitPolicy, RateLimitStorePtr};
use std::sync::Arc;

/// Creates the process-local store. Correct only for a single instance.
pub fn create_memory(policy: RateLimitPolicy) -> RateLimitStorePtr {
    // ---
    Arc::new(InMemoryRateLimitStore::new(policy))
}

/// Creates a Redis-backed store shared by every instance pointing at `url`.
///
/// The client connects lazily; a bad URL fails here, an unreachable server
/// fails on first use.
pub fn create_redis(url: &str, policy: RateLimitPolicy) -> anyhow::Result<RateLimitStorePtr> {
    // ---
    tracing::info!("Using Redis login rate limiter");
    let client = redis::Client::open(url)?;
    Ok(Arc::new(RedisRateLimitStore::new(client, policy)))
}
