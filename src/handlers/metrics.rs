use crate::app_state::AppState;
use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;

/// Handler for the `/metrics` endpoint.
///
/// Returns metrics in Prometheus text format for scraping. With the no-op
/// backend the body is empty.
pub async fn metrics_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    // ---
    let metrics_text = app_state.metrics().render();

    (
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        metrics_text,
    )
}

/// Records duration and status of every routed request.
///
/// The matched route template is used as the path label so ids and query
/// strings do not explode label cardinality.
pub async fn track_http_requests(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    // ---
    let start = Instant::now();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_string());
    let method = request.method().to_string();

    let response = next.run(request).await;

    app_state
        .metrics()
        .record_http_request(start, &path, &method, response.status().as_u16());
    response
}
