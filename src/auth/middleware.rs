//! Gate for privileged endpoints.
//!
//! [`require_manager`] is the single entry point; [`Manager`] wraps it as an axum
//! extractor so a handler is protected by naming it in its arguments.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::authenticator::Authenticator;
use super::error::ErrorKind;
use super::token::SessionClaims;
use crate::app_state::AppState;
use crate::handlers::ApiError;

/// Accepts the request's manager session or produces a uniform 401.
///
/// Every failure, including an unset secret, becomes the same response. The reason
/// is logged here and nowhere else: misconfiguration at `error`, rejected sessions
/// at `debug`.
pub fn require_manager(auth: &Authenticator, headers: &HeaderMap) -> Result<SessionClaims, ApiError> {
    // ---
    auth.validate_session(headers).map_err(|err| {
        match err.kind() {
            ErrorKind::Misconfiguration => {
                tracing::error!("Manager session check misconfigured: {}", err)
            }
            ErrorKind::Unauthorized => {
                tracing::debug!("Manager session rejected: {}", err)
            }
        }
        ApiError::unauthorized()
    })
}

/// A request authenticated as the manager.
#[derive(Debug, Clone)]
pub struct Manager(pub SessionClaims);

impl FromRequestParts<AppState> for Manager {
    // ---
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // ---
        let outcome = require_manager(state.auth(), &parts.headers);
        state.metrics().record_session_check(outcome.is_ok());

        outcome.map(Manager)
    }
}
