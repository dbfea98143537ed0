use std::sync::Arc;
use std::time::Instant;

/// Result of one admin login attempt, as recorded in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    // ---
    Success,
    Invalid,
    RateLimited,
    BadRequest,
    Misconfigured,
}

impl LoginOutcome {
    // ---
    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            LoginOutcome::Success => "success",
            LoginOutcome::Invalid => "invalid",
            LoginOutcome::RateLimited => "rate_limited",
            LoginOutcome::BadRequest => "bad_request",
            LoginOutcome::Misconfigured => "misconfigured",
        }
    }
}

/// Abstraction for application metrics (counters, histograms).
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Render current metrics in Prometheus text format.
    fn render(&self) -> String;

    /// Record an admin login attempt and how it ended.
    fn record_login(&self, outcome: LoginOutcome);

    /// Record a manager session check.
    fn record_session_check(&self, accepted: bool);

    /// Record a review submission by response status class.
    fn record_review(&self, outcome: &'static str);

    /// Record HTTP request duration and labels.
    fn record_http_request(&self, start: Instant, path: &str, method: &str, status: u16);
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;
