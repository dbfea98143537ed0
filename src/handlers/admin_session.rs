use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use super::shared_types::ApiError;
use crate::app_state::AppState;
use crate::auth::Manager;

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    role: String,
}

/// `POST /admin/logout`
///
/// Always answers with an expiring cookie; it does not look at the current session.
pub async fn admin_logout(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    // ---
    let set_cookie = state.auth().clear_session().map_err(|err| {
        tracing::error!("Admin logout misconfigured: {}", err);
        ApiError::misconfigured()
    })?;

    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, set_cookie)]))
}

/// `GET /admin/me`
///
/// 200 with the session role when the request carries a valid manager session.
pub async fn admin_me(Manager(claims): Manager) -> Json<SessionInfo> {
    // ---
    Json(SessionInfo { role: claims.role })
}
