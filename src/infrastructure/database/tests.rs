//! Live Postgres tests. Run with `DATABASE_URL` set and `--ignored`.

use super::postgres_repository::*;
use crate::domain::{NewReview, ReviewOutcome, ReviewRepository};
use once_cell::sync::Lazy;
use sqlx::postgres::PgPoolOptions;
use tokio::runtime::Runtime;

/// Shared tokio runtime for all database tests.
///
/// The pool lives inside the repository and its connections are bound to the
/// runtime that opened them, so every test runs on this one runtime rather than
/// a per-test `#[tokio::test]` runtime.
static RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    // ---
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create TOKIO runtime")
});

static REPO: Lazy<PostgresReviewRepository> = Lazy::new(|| {
    // ---
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let _guard = RUNTIME.enter();
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect_lazy(&url)
        .expect("invalid DATABASE_URL");
    PostgresReviewRepository::new(pool)
});

static TRACING_INIT: std::sync::Once = std::sync::Once::new();

fn init_tracing() {
    // ---
    TRACING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_ansi(false)
            .with_test_writer()
            .init();
    });
}

/// A user hash no earlier run has used.
fn unique_user(tag: &str) -> String {
    // ---
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{tag}-{}-{nanos}", std::process::id())
}

fn review(teacher_id: i32, user_hash: &str, rating: i32) -> NewReview {
    // ---
    NewReview {
        teacher_id,
        user_hash: user_hash.to_string(),
        rating,
        comment: "Clear explanations and fair grading".to_string(),
    }
}

#[test]
#[ignore] // needs a running Postgres
fn test_review_updates_teacher_aggregates() {
    // ---
    RUNTIME.block_on(async {
        // ---
        init_tracing();
        let repo = &*REPO;

        let teacher = repo.create_teacher("Balin").await.expect("create teacher");

        let outcome = repo
            .submit_review(review(teacher, &unique_user("a"), 5))
            .await
            .expect("submit");
        assert_eq!(outcome, ReviewOutcome::Created);

        let outcome = repo
            .submit_review(review(teacher, &unique_user("b"), 2))
            .await
            .expect("submit");
        assert_eq!(outcome, ReviewOutcome::Created);

        let (avg, count) = repo
            .teacher_stats(teacher)
            .await
            .expect("stats")
            .expect("teacher exists");
        assert_eq!(count, 2);
        assert!((avg - 3.5).abs() < 1e-4, "avg was {avg}");
    });
}

#[test]
#[ignore] // needs a running Postgres
fn test_second_review_by_same_user_is_rejected() {
    // ---
    RUNTIME.block_on(async {
        // ---
        init_tracing();
        let repo = &*REPO;

        let teacher = repo.create_teacher("Dwalin").await.expect("create teacher");
        let user = unique_user("dup");

        assert_eq!(
            repo.submit_review(review(teacher, &user, 4)).await.unwrap(),
            ReviewOutcome::Created
        );
        assert_eq!(
            repo.submit_review(review(teacher, &user, 1)).await.unwrap(),
            ReviewOutcome::AlreadyReviewed
        );

        let (avg, count) = repo.teacher_stats(teacher).await.unwrap().unwrap();
        assert_eq!(count, 1);
        assert!((avg - 4.0).abs() < 1e-4);
    });
}

#[test]
#[ignore] // needs a running Postgres
fn test_unknown_teacher() {
    // ---
    RUNTIME.block_on(async {
        // ---
        init_tracing();
        let repo = &*REPO;

        let outcome = repo
            .submit_review(review(i32::MAX, &unique_user("ghost"), 3))
            .await
            .expect("submit");
        assert_eq!(outcome, ReviewOutcome::TeacherNotFound);
        assert!(repo.teacher_stats(i32::MAX).await.unwrap().is_none());
    });
}

#[test]
#[ignore] // needs a running Postgres
fn test_ping() {
    // ---
    RUNTIME.block_on(async {
        // ---
        init_tracing();
        REPO.ping().await.expect("ping");
    });
}
