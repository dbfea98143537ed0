use crate::domain::{LoginOutcome, Metrics};
use std::time::Instant;

/// Metrics sink that records nothing.
#[derive(Default)]
pub struct NoopMetrics;

impl NoopMetrics {
    pub fn new() -> Self {
        NoopMetrics
    }
}

impl Metrics for NoopMetrics {
    // ---
    fn render(&self) -> String {
        String::new()
    }
    fn record_login(&self, _: LoginOutcome) {}
    fn record_session_check(&self, _: bool) {}
    fn record_review(&self, _: &'static str) {}
    fn record_http_request(&self, _: Instant, _: &str, _: &str, _: u16) {}
}
