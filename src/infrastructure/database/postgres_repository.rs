use anyhow::Result;
use sqlx::PgPool;
use tokio::sync::OnceCell;

use crate::domain::{NewReview, ReviewOutcome, ReviewRepository};

const CREATE_TEACHERS: &str = "
    CREATE TABLE IF NOT EXISTS teachers (
        id SERIAL PRIMARY KEY,
        full_name TEXT NOT NULL,
        subject TEXT,
        avg_rating REAL DEFAULT 0,
        reviews_count INT DEFAULT 0
    )";

const CREATE_REVIEWS: &str = "
    CREATE TABLE IF NOT EXISTS reviews (
        id SERIAL PRIMARY KEY,
        teacher_id INT NOT NULL REFERENCES teachers(id),
        user_hash TEXT NOT NULL,
        rating INT NOT NULL CHECK (rating BETWEEN 1 AND 5),
        comment TEXT NOT NULL CHECK (char_length(comment) BETWEEN 10 AND 800),
        created_at TIMESTAMP DEFAULT now(),
        UNIQUE (user_hash, teacher_id)
    )";

pub struct PostgresReviewRepository {
    // ---
    pool: PgPool,

    /// Set once the schema exists. A failed attempt leaves it empty so the next
    /// request retries.
    schema: OnceCell<()>,
}

impl PostgresReviewRepository {
    // ---
    pub fn new(pool: PgPool) -> Self {
        // ---
        Self {
            pool,
            schema: OnceCell::new(),
        }
    }

    async fn ensure_schema(&self) -> Result<()> {
        // ---
        self.schema
            .get_or_try_init(|| async {
                sqlx::query(CREATE_TEACHERS).execute(&self.pool).await?;
                sqlx::query(CREATE_REVIEWS).execute(&self.pool).await?;
                tracing::info!("Review schema ready");
                Ok::<(), sqlx::Error>(())
            })
            .await?;

        Ok(())
    }

    /// Inserts a teacher row. Teachers are managed elsewhere; this exists for
    /// seeding and tests.
    pub async fn create_teacher(&self, full_name: &str) -> Result<i32> {
        // ---
        self.ensure_schema().await?;

        let id: i32 = sqlx::query_scalar("INSERT INTO teachers (full_name) VALUES ($1) RETURNING id")
            .bind(full_name)
            .fetch_one(&self.pool)
            .await?;

        Ok(id)
    }

    /// Current `(avg_rating, reviews_count)` aggregates for a teacher.
    pub async fn teacher_stats(&self, teacher_id: i32) -> Result<Option<(f32, i32)>> {
        // ---
        self.ensure_schema().await?;

        let row = sqlx::query_as::<_, (f32, i32)>(
            "SELECT COALESCE(avg_rating, 0), COALESCE(reviews_count, 0) FROM teachers WHERE id = $1",
        )
        .bind(teacher_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

#[async_trait::async_trait]
impl ReviewRepository for PostgresReviewRepository {
    // ---
    async fn submit_review(&self, review: NewReview) -> Result<ReviewOutcome> {
        // ---
        self.ensure_schema().await?;

        let mut tx = self.pool.begin().await?;

        let teacher: Option<i32> = sqlx::query_scalar("SELECT id FROM teachers WHERE id = $1 LIMIT 1")
            .bind(review.teacher_id)
            .fetch_optional(&mut *tx)
            .await?;
        if teacher.is_none() {
            return Ok(ReviewOutcome::TeacherNotFound);
        }

        let existing: Option<i32> = sqlx::query_scalar(
            "SELECT id FROM reviews WHERE user_hash = $1 AND teacher_id = $2 LIMIT 1",
        )
        .bind(&review.user_hash)
        .bind(review.teacher_id)
        .fetch_optional(&mut *tx)
        .await?;
        if existing.is_some() {
            return Ok(ReviewOutcome::AlreadyReviewed);
        }

        let inserted = sqlx::query(
            "INSERT INTO reviews (teacher_id, user_hash, rating, comment) VALUES ($1, $2, $3, $4)",
        )
        .bind(review.teacher_id)
        .bind(&review.user_hash)
        .bind(review.rating)
        .bind(&review.comment)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            // A concurrent submission won the UNIQUE (user_hash, teacher_id) race
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Ok(ReviewOutcome::AlreadyReviewed);
            }
            Err(err) => return Err(err.into()),
        }

        sqlx::query(
            "UPDATE teachers SET
                avg_rating = COALESCE((SELECT AVG(rating)::real FROM reviews WHERE teacher_id = $1), 0),
                reviews_count = COALESCE((SELECT COUNT(*) FROM reviews WHERE teacher_id = $1), 0)
             WHERE id = $1",
        )
        .bind(review.teacher_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Stored review for teacher {}", review.teacher_id);
        Ok(ReviewOutcome::Created)
    }

    async fn ping(&self) -> Result<()> {
        // ---
        self.ensure_schema().await?;
        sqlx::query("SELECT 1 FROM teachers LIMIT 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
