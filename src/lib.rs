// src/lib.rs
use anyhow::Result;
use app_state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use auth::Authenticator;
use handlers::*;

// Public exports (visible outside this module)
pub mod auth;
pub mod domain;

// Internal-only exports (sibling access within this module)
mod app_state;
mod config;
mod handlers;
mod infrastructure;

pub use config::*;
pub use handlers::{ApiError, ErrorBody};

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    create_memory_rate_limiter, // ---
    create_memory_review_repository,
    create_noop_metrics,
    create_postgres_review_repository,
    create_prom_metrics,
    create_redis_rate_limiter,
};

/// Build the HTTP router from environment configuration.
pub fn create_router() -> Result<Router> {
    // ---
    build_router(AppConfig::from_env()?)
}

/// Build the HTTP router with every backend selected by `config`.
pub fn build_router(config: AppConfig) -> Result<Router> {
    // ---
    tracing_subscriber::fmt::try_init().ok(); // Ignores if already initialized

    let metrics = match config.server.metrics_type {
        MetricsType::Prom => create_prom_metrics()?,
        MetricsType::Noop => create_noop_metrics()?,
    };

    let rate_limiter = match &config.rate_limit.backend {
        RateLimitBackend::Memory => create_memory_rate_limiter(config.rate_limit.policy),
        RateLimitBackend::Redis { url } => {
            create_redis_rate_limiter(url, config.rate_limit.policy)?
        }
    };

    let reviews = match &config.review_store {
        ReviewStoreConfig::Memory { teacher_ids } => create_memory_review_repository(teacher_ids),
        ReviewStoreConfig::Postgres(database) => create_postgres_review_repository(database)?,
    };

    let auth = Arc::new(Authenticator::from_config(&config.auth, &config.telegram));

    let app_state = AppState::new(auth, metrics, rate_limiter, reviews);

    let router = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .nest(
            "/admin",
            Router::new()
                .route("/login", post(admin_login))
                .route("/logout", post(admin_logout))
                .route("/me", get(admin_me)),
        )
        .route("/reviews", post(submit_review))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            track_http_requests,
        ))
        .with_state(app_state);

    Ok(router)
}
