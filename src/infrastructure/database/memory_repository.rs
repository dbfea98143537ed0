use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::domain::{NewReview, ReviewOutcome, ReviewRepository};

#[derive(Debug, Default)]
struct Store {
    teachers: HashSet<i32>,
    reviews: HashMap<(String, i32), NewReview>,
}

/// Review repository held in process memory, for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryReviewRepository {
    // ---
    store: Mutex<Store>,
}

impl InMemoryReviewRepository {
    // ---
    pub fn with_teachers(teacher_ids: impl IntoIterator<Item = i32>) -> Self {
        // ---
        Self {
            store: Mutex::new(Store {
                teachers: teacher_ids.into_iter().collect(),
                reviews: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Store> {
        // ---
        self.store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reviews stored for `teacher_id`.
    pub fn reviews_for(&self, teacher_id: i32) -> Vec<NewReview> {
        // ---
        self.lock()
            .reviews
            .values()
            .filter(|r| r.teacher_id == teacher_id)
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl ReviewRepository for InMemoryReviewRepository {
    // ---
    async fn submit_review(&self, review: NewReview) -> Result<ReviewOutcome> {
        // ---
        let mut store = self.lock();

        if !store.teachers.contains(&review.teacher_id) {
            return Ok(ReviewOutcome::TeacherNotFound);
        }

        let key = (review.user_hash.clone(), review.teacher_id);
        if store.reviews.contains_key(&key) {
            return Ok(ReviewOutcome::AlreadyReviewed);
        }

        store.reviews.insert(key, review);
        Ok(ReviewOutcome::Created)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
