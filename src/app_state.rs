//! Application state management.
//!
//! This module defines the shared state passed to all Axum handlers via the
//! `State` extractor: the authentication layer, the metrics sink, the login rate
//! limiter and the review store. Everything heavy sits behind an `Arc`, so the
//! per-request clone is cheap.

use crate::auth::Authenticator;
use crate::domain::{MetricsPtr, RateLimitStorePtr, ReviewRepositoryPtr};
use std::sync::Arc;

/// Shared application state passed to all Axum handlers.
///
/// This struct serves as the Dependency Injection container for the application.
///
/// # Design Principles
///
/// - **Dependency Inversion**: Handlers depend on abstractions
///   (`RateLimitStore`, `ReviewRepository`, `Metrics`), not concrete backends.
/// - **Immutable After Initialization**: State is built once at startup and
///   never mutated; backends do their own interior locking.
///
/// # Lifecycle
///
/// 1. Created once in `build_router()` during application startup
/// 2. Attached to the Axum router via `.with_state(app_state)`
/// 3. Cloned automatically by Axum for each incoming HTTP request
/// 4. Handlers extract via `State(state): State<AppState>`
#[derive(Clone)]
pub struct AppState {
    /// Secrets, session tokens, passphrase and Telegram verification.
    auth: Arc<Authenticator>,

    /// Either Prometheus-backed or no-op.
    metrics: MetricsPtr,

    /// Failed-login counters, in memory or Redis.
    rate_limiter: RateLimitStorePtr,

    /// Review persistence, in memory or Postgres.
    reviews: ReviewRepositoryPtr,
}

impl AppState {
    // ---

    pub(crate) fn new(
        auth: Arc<Authenticator>,
        metrics: MetricsPtr,
        rate_limiter: RateLimitStorePtr,
        reviews: ReviewRepositoryPtr,
    ) -> Self {
        // ---
        AppState {
            auth,
            metrics,
            rate_limiter,
            reviews,
        }
    }

    pub(crate) fn auth(&self) -> &Authenticator {
        // ---
        &self.auth
    }

    /// Get a reference to the metrics implementation.
    pub(crate) fn metrics(&self) -> &MetricsPtr {
        // ---
        &self.metrics
    }

    pub(crate) fn rate_limiter(&self) -> &RateLimitStorePtr {
        // ---
        &self.rate_limiter
    }

    /// Get a reference to the review repository.
    pub(crate) fn reviews(&self) -> &ReviewRepositoryPtr {
        // ---
        &self.reviews
    }
}

#[cfg(test)]
mod tests {
    // ---

    use super::*;
    use crate::config::{AuthConfig, TelegramConfig};
    use crate::domain::RateLimitPolicy;
    use crate::infrastructure::{
        create_memory_rate_limiter, create_memory_review_repository, create_noop_metrics,
    };
    use std::time::Duration;

    fn test_state() -> AppState {
        // ---
        let auth = AuthConfig {
            hmac_secret: Some("state-secret".to_string()),
            passphrase_hash: None,
            cookie_name: "__mgr".to_string(),
            cookie_domain: None,
            session_ttl: Duration::from_secs(60),
        };
        let telegram = TelegramConfig {
            webapp_secret: None,
        };

        AppState::new(
            Arc::new(Authenticator::from_config(&auth, &telegram)),
            create_noop_metrics().unwrap(),
            create_memory_rate_limiter(RateLimitPolicy::default()),
            create_memory_review_repository(&[1]),
        )
    }

    #[test]
    fn test_app_state_creation_and_clone() {
        // ---
        let app_state = test_state();
        let cloned = app_state.clone();

        assert_eq!(cloned.auth().session_ttl_secs(), 60);
        assert!(Arc::ptr_eq(app_state.metrics(), cloned.metrics()));
        assert!(Arc::ptr_eq(app_state.reviews(), cloned.reviews()));
    }

    #[tokio::test]
    async fn test_clones_share_the_rate_limiter() {
        // ---
        let app_state = test_state();
        let cloned = app_state.clone();

        app_state.rate_limiter().register_failure("k").await.unwrap();
        assert_eq!(cloned.rate_limiter().check("k").await.unwrap().attempts, 1);
    }
}
