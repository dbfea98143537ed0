use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

/// Fixed-window login throttling parameters.
///
/// A client may fail `max_attempts` times; the window restarts on each failure
/// while the entry is still active. Because the window is fixed rather than a
/// sliding log, a client straddling a window boundary can get up to twice
/// `max_attempts` tries. That approximation is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    // ---
    pub window: Duration,
    pub max_attempts: u32,
}

impl RateLimitPolicy {
    /// Longest window a store will honour.
    pub const MAX_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

    /// `window` capped to [`Self::MAX_WINDOW`].
    pub fn effective_window(&self) -> Duration {
        // ---
        self.window.min(Self::MAX_WINDOW)
    }
}

impl Default for RateLimitPolicy {
    // ---
    fn default() -> Self {
        // ---
        Self {
            window: Duration::from_secs(10 * 60),
            max_attempts: 5,
        }
    }
}

/// Answer from [`RateLimitStore::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    // ---
    pub limited: bool,

    /// Failed attempts counted in the active window.
    pub attempts: u32,
}

/// Key/value counter store for failed logins, keyed by client fingerprint.
///
/// Implementations must treat an entry whose window has lapsed as absent.
#[async_trait::async_trait]
pub trait RateLimitStore: Send + Sync {
    // ---
    /// Whether `key` has exhausted its attempt budget.
    async fn check(&self, key: &str) -> Result<RateLimitStatus>;

    /// Count one failed attempt for `key`.
    async fn register_failure(&self, key: &str) -> Result<()>;

    /// Forget `key`, typically after a successful login.
    async fn clear(&self, key: &str) -> Result<()>;
}

/// Type alias for any backend that implements RateLimitStore.
pub type RateLimitStorePtr = Arc<dyn RateLimitStore>;
