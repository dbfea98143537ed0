use anyhow::Result;
use std::sync::Arc;

/// A validated review whose author has been reduced to an HMAC digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    // ---
    pub teacher_id: i32,

    /// `HMAC-SHA256(secret, telegram_user_id)` hex. Raw Telegram ids never get here.
    pub user_hash: String,
    pub rating: i32,
    pub comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    // ---
    Created,
    TeacherNotFound,
    AlreadyReviewed,
}

/// Abstraction for review persistence.
#[async_trait::async_trait]
pub trait ReviewRepository: Send + Sync {
    // ---
    /// Store a review unless the teacher is unknown or this user already reviewed them.
    async fn submit_review(&self, review: NewReview) -> Result<ReviewOutcome>;

    /// Cheap round trip to the backing store, used by the full health check.
    async fn ping(&self) -> Result<()>;
}

/// Type alias for any backend that implements ReviewRepository.
pub type ReviewRepositoryPtr = Arc<dyn ReviewRepository>;
