//! Redis-backed login rate limiter for multi-instance deployments.
//!
//! The window is the key's TTL. `INCR` on a missing or expired key starts at one,
//! and every failure re-arms the TTL, which is the same fixed-window behaviour as
//! the in-memory store.

use anyhow::Result;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};

use crate::domain::{RateLimitPolicy, RateLimitStatus, RateLimitStore};

const KEY_PREFIX: &str = "miniapp:login:";

pub struct RedisRateLimitStore {
    // ---
    client: Client,
    policy: RateLimitPolicy,
}

impl RedisRateLimitStore {
    // ---
    pub fn new(client: Client, policy: RateLimitPolicy) -> Self {
        // ---
        Self { client, policy }
    }

    async fn conn(&self) -> Result<MultiplexedConnection> {
        // ---
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|err| {
                tracing::error!("Failed to connect to Redis: {:?}", err);
                err.into()
            })
    }

    fn window_secs(&self) -> i64 {
        // ---
        self.policy.effective_window().as_secs().max(1) as i64
    }
}

fn redis_key(key: &str) -> String {
    // ---
    format!("{KEY_PREFIX}{key}")
}

#[async_trait::async_trait]
impl RateLimitStore for RedisRateLimitStore {
    // ---
    async fn check(&self, key: &str) -> Result<RateLimitStatus> {
        // ---
        let mut conn = self.conn().await?;
        let attempts: Option<u32> = conn.get(redis_key(key)).await?;
        let attempts = attempts.unwrap_or(0);

        Ok(RateLimitStatus {
            limited: attempts >= self.policy.max_attempts,
            attempts,
        })
    }

    async fn register_failure(&self, key: &str) -> Result<()> {
        // ---
        let mut conn = self.conn().await?;
        let key = redis_key(key);

        let _: () = redis::pipe()
            .atomic()
            .incr(&key, 1)
            .ignore()
            .expire(&key, self.window_secs())
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<()> {
        // ---
        let mut conn = self.conn().await?;
        let _: () = conn.del(redis_key(key)).await?;
        Ok(())
    }
}
