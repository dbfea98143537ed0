use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use super::shared_types::ApiError;
use crate::app_state::AppState;
use crate::domain::{NewReview, ReviewOutcome};

const COMMENT_MIN_CHARS: usize = 10;
const COMMENT_MAX_CHARS: usize = 800;
const UNVERIFIED_MESSAGE: &str = "Could not verify user";

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    status: &'static str,
}

/// A review body that passed shape validation but not yet `initData` verification.
#[derive(Debug, PartialEq, Eq)]
struct ReviewRequest {
    teacher_id: i32,
    rating: i32,
    comment: String,
    init_data: String,
}

impl ReviewRequest {
    // ---
    /// Checks fields in a fixed order and reports the first violation.
    fn validate(body: &Value) -> Result<Self, &'static str> {
        // ---
        let teacher_id = body
            .get("teacher_id")
            .and_then(Value::as_i64)
            .filter(|id| *id > 0)
            .and_then(|id| i32::try_from(id).ok())
            .ok_or("teacher_id must be a positive integer")?;

        let rating = body
            .get("rating")
            .and_then(Value::as_i64)
            .filter(|r| (1..=5).contains(r))
            .ok_or("rating must be an integer from 1 to 5")?;

        let comment = body
            .get("comment")
            .and_then(Value::as_str)
            .ok_or("comment is required")?
            .trim();
        let chars = comment.chars().count();
        if !(COMMENT_MIN_CHARS..=COMMENT_MAX_CHARS).contains(&chars) {
            return Err("comment must be between 10 and 800 characters");
        }

        let init_data = body
            .get("initData")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .ok_or("initData is required")?;

        Ok(Self {
            teacher_id,
            rating: rating as i32,
            comment: comment.to_string(),
            init_data: init_data.to_string(),
        })
    }
}

/// `POST /reviews`
///
/// Stores a review from a Telegram Mini App user. The author is identified only
/// by an HMAC of their verified Telegram id.
#[tracing::instrument(skip_all)]
pub async fn submit_review(State(state): State<AppState>, body: Bytes) -> Response {
    // ---
    let (outcome, response) = match submit(&state, &body).await {
        Ok(()) => (
            "created",
            (StatusCode::CREATED, Json(CreatedResponse { status: "created" })).into_response(),
        ),
        Err((outcome, err)) => (outcome, err.into_response()),
    };

    state.metrics().record_review(outcome);
    response
}

async fn submit(state: &AppState, body: &[u8]) -> Result<(), (&'static str, ApiError)> {
    // ---
    let value: Value = if body.is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_slice(body)
            .map_err(|_| ("bad_request", ApiError::bad_request("Invalid JSON")))?
    };

    let request =
        ReviewRequest::validate(&value).map_err(|msg| ("bad_request", ApiError::bad_request(msg)))?;

    let auth = state.auth();
    let user = auth.verify_init_data(&request.init_data).map_err(|err| {
        let outcome = if err.is_misconfiguration() {
            tracing::error!("Review submission misconfigured: {}", err);
            "misconfigured"
        } else {
            tracing::warn!("Review rejected: {}", err);
            "unverified"
        };
        (outcome, ApiError::from_auth(&err, UNVERIFIED_MESSAGE))
    })?;

    let user_hash = auth.user_hash(user.id).map_err(|err| {
        tracing::error!("Review submission misconfigured: {}", err);
        ("misconfigured", ApiError::from_auth(&err, UNVERIFIED_MESSAGE))
    })?;

    let review = NewReview {
        teacher_id: request.teacher_id,
        user_hash,
        rating: request.rating,
        comment: request.comment,
    };

    match state.reviews().submit_review(review).await {
        Ok(ReviewOutcome::Created) => Ok(()),
        Ok(ReviewOutcome::TeacherNotFound) => Err((
            "teacher_not_found",
            ApiError::bad_request("Teacher not found"),
        )),
        Ok(ReviewOutcome::AlreadyReviewed) => Err((
            "duplicate",
            ApiError::new(StatusCode::CONFLICT, "You have already reviewed this teacher"),
        )),
        Err(err) => {
            tracing::error!("Failed to store review: {:?}", err);
            Err((
                "error",
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Could not save review"),
            ))
        }
    }
}
