mod memory_repository;
mod postgres_repository;

#[cfg(test)]
mod tests;

pub use memory_repository::InMemoryReviewRepository;
pub use postgres_repository::PostgresReviewRepository;

use crate::config::DatabaseConfig;
use crate::domain::ReviewRepositoryPtr;
use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

/// Creates the Postgres review repository.
///
/// The pool connects lazily and the schema is created on first use, so startup
/// does not depend on the database being reachable.
pub fn create_postgres_review_repository(config: &DatabaseConfig) -> Result<ReviewRepositoryPtr> {
    // ---
    tracing::info!(
        "Creating Postgres review repository (pool {}..{})",
        config.min_connections,
        config.max_connections
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_lazy(&config.database_url)?;

    Ok(Arc::new(PostgresReviewRepository::new(pool)))
}

/// Creates an in-memory review repository knowing only `teacher_ids`.
pub fn create_memory_review_repository(teacher_ids: &[i32]) -> ReviewRepositoryPtr {
    // ---
    Arc::new(InMemoryReviewRepository::with_teachers(teacher_ids.iter().copied()))
}
