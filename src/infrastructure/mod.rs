mod database;
pub mod metrics;
pub mod rate_limit;

// Re-export the factory functions for easy access
pub use database::{create_memory_review_repository, create_postgres_review_repository};
pub use metrics::{create_noop_metrics, create_prom_metrics};
pub use rate_limit::{create_memory as create_memory_rate_limiter, create_redis as create_redis_rate_limiter};
