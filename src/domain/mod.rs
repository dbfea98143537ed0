mod metrics;
mod rate_limit;
mod reviews;

// Publicly expose the Metrics abstraction
pub use metrics::{LoginOutcome, Metrics, MetricsPtr};

// Login throttling abstraction, backed by process memory or Redis
pub use rate_limit::{RateLimitPolicy, RateLimitStatus, RateLimitStore, RateLimitStorePtr};

// Review persistence abstraction
pub use reviews::{NewReview, ReviewOutcome, ReviewRepository, ReviewRepositoryPtr};
