use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::borrow::Cow;

use crate::auth::{AuthError, ErrorKind};

/// JSON error body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: Cow<'static, str>,
}

/// Error returned by every handler.
///
/// Only the status and a generic message reach the client; handlers log the
/// specifics before building one.
#[derive(Debug)]
pub struct ApiError {
    // ---
    status: StatusCode,
    message: Cow<'static, str>,
}

impl ApiError {
    // ---
    pub fn new(status: StatusCode, message: impl Into<Cow<'static, str>>) -> Self {
        // ---
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        // ---
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        // ---
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn misconfigured() -> Self {
        // ---
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server misconfigured")
    }

    /// Maps an auth-layer error onto its response class, with `unauthorized_message`
    /// as the body for rejected credentials.
    pub fn from_auth(err: &AuthError, unauthorized_message: &'static str) -> Self {
        // ---
        match err.kind() {
            ErrorKind::Misconfiguration => Self::misconfigured(),
            ErrorKind::Unauthorized => Self::new(StatusCode::UNAUTHORIZED, unauthorized_message),
        }
    }
}

impl IntoResponse for ApiError {
    // ---
    fn into_response(self) -> Response {
        (
            self.status,
            axum::Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
