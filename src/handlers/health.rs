use crate::app_state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

#[derive(serde::Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

#[derive(Deserialize)]
pub struct HealthQuery {
    mode: Option<String>,
}

/// Responds with the health status of the server.
///
/// - By default, performs a light check confirming the web server is running.
/// - With `mode=full`, also pings the review store.
///
/// # Responses
/// - `200 OK` with `{ "status": "ok" }` when healthy.
/// - `500 INTERNAL SERVER ERROR` with `{ "status": "error" }` when the review
///   store cannot be reached in full mode.
pub async fn health_check(
    State(state): State<AppState>,
    Query(params): Query<HealthQuery>,
) -> (StatusCode, Json<HealthResponse>) {
    // ---
    match params.mode.as_deref() {
        Some("full") => match state.reviews().ping().await {
            Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "ok" })),
            Err(err) => {
                tracing::error!("Health check failed: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(HealthResponse { status: "error" }),
                )
            }
        },
        _ => (StatusCode::OK, Json(HealthResponse { status: "ok" })),
    }
}
