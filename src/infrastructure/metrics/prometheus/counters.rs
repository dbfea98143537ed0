use metrics::{counter, histogram};
use std::time::Instant;

/// Count an admin login attempt by outcome.
pub fn increment_login(outcome: &'static str) {
    counter!("admin_login_attempts_total", "outcome" => outcome).increment(1);
}

/// Count a manager session check.
pub fn increment_session_check(accepted: bool) {
    let result = if accepted { "accepted" } else { "rejected" };
    counter!("admin_session_checks_total", "result" => result).increment(1);
}

/// Count a review submission by outcome.
pub fn increment_review(outcome: &'static str) {
    counter!("review_submissions_total", "outcome" => outcome).increment(1);
}

/// Track HTTP request latency using a histogram.
pub fn track_http_request(start: Instant, path: &str, method: &str, status: u16) {
    let elapsed = start.elapsed();
    histogram!(
        "http_request_duration_seconds",
        "path" => path.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .record(elapsed);
}
