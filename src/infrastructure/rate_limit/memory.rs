//! Process-local login rate limiter.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use crate::domain::{RateLimitPolicy, RateLimitStatus, RateLimitStore};

#[derive(Debug, Clone, Copy)]
struct Entry {
    count: u32,
    expires_at: Instant,
}

impl Entry {
    fn is_active(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Fixed-window failure counter held in process memory.
///
/// Each operation takes the lock once and does its read-check-write inside it,
/// so concurrent requests for the same key cannot interleave. State is lost on
/// restart and not shared between instances.
#[derive(Debug)]
pub struct InMemoryRateLimitStore {
    // ---
    policy: RateLimitPolicy,
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryRateLimitStore {
    // ---
    pub fn new(policy: RateLimitPolicy) -> Self {
        // ---
        Self {
            policy,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        // ---
        // A panic while holding the lock cannot leave a half-written entry
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// [`RateLimitStore::check`] as of `now`. Lapsed entries are pruned.
    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitStatus {
        // ---
        let mut entries = self.lock();

        match entries.get(key).copied() {
            Some(entry) if entry.is_active(now) => RateLimitStatus {
                limited: entry.count >= self.policy.max_attempts,
                attempts: entry.count,
            },
            Some(_) => {
                entries.remove(key);
                RateLimitStatus {
                    limited: false,
                    attempts: 0,
                }
            }
            None => RateLimitStatus {
                limited: false,
                attempts: 0,
            },
        }
    }

    /// [`RateLimitStore::register_failure`] as of `now`.
    ///
    /// An active entry is incremented and its window restarted; otherwise counting
    /// starts again at one. Lapsed entries for every key are dropped first, so the
    /// map only holds clients inside their window.
    pub fn register_failure_at(&self, key: &str, now: Instant) {
        // ---
        let mut entries = self.lock();
        entries.retain(|_, entry| entry.is_active(now));

        let count = entries
            .get(key)
            .map_or(1, |entry| entry.count.saturating_add(1));

        let Some(expires_at) = now.checked_add(self.policy.effective_window()) else {
            tracing::error!("Rate-limit window overflows the clock, failure not recorded");
            return;
        };

        entries.insert(key.to_string(), Entry { count, expires_at });
    }

    pub fn clear_key(&self, key: &str) {
        // ---
        self.lock().remove(key);
    }

    /// Number of tracked keys, including lapsed ones not yet pruned.
    pub fn len(&self) -> usize {
        // ---
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        // ---
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    // ---
    async fn check(&self, key: &str) -> Result<RateLimitStatus> {
        Ok(self.check_at(key, Instant::now()))
    }

    async fn register_failure(&self, key: &str) -> Result<()> {
        self.register_failure_at(key, Instant::now());
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<()> {
        self.clear_key(key);
        Ok(())
    }
}
