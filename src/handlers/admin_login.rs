use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use super::shared_types::ApiError;
use crate::app_state::AppState;
use crate::domain::LoginOutcome;

/// Fields read from the login body. Anything else is ignored.
#[derive(Debug, Default)]
struct LoginRequest {
    passphrase: Option<String>,

    /// The browser's user agent as the client reports it; the session is bound to it.
    ua: String,
}

impl LoginRequest {
    // ---
    fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        // ---
        if body.is_empty() {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_slice(body)?;
        let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_owned);

        Ok(Self {
            passphrase: field("passphrase").filter(|p| !p.is_empty()),
            ua: field("ua").unwrap_or_default(),
        })
    }
}

const INVALID_CREDENTIALS: &str = "Invalid credentials";

type LoginFailure = (LoginOutcome, ApiError);

/// `POST /admin/login`
///
/// Verifies the admin passphrase and answers 204 with the session cookie.
/// Failed attempts count against the client's rate-limit key; a success clears it.
#[tracing::instrument(skip_all)]
pub async fn admin_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // ---
    match login(&state, &headers, &body).await {
        Ok(set_cookie) => {
            state.metrics().record_login(LoginOutcome::Success);
            (StatusCode::NO_CONTENT, [(header::SET_COOKIE, set_cookie)]).into_response()
        }
        Err((outcome, err)) => {
            state.metrics().record_login(outcome);
            err.into_response()
        }
    }
}

async fn login(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<String, LoginFailure> {
    // ---
    let auth = state.auth();

    if !auth.has_server_secret() {
        tracing::error!("Admin login misconfigured: HMAC_SECRET is not set");
        return Err(misconfigured());
    }

    let key = auth.client_key(headers).map_err(|err| {
        tracing::error!("Admin login misconfigured: {}", err);
        misconfigured()
    })?;

    if let Some(key) = key.as_deref() {
        match state.rate_limiter().check(key).await {
            Ok(status) if status.limited => {
                tracing::warn!("Admin login throttled after {} failures", status.attempts);
                return Err((
                    LoginOutcome::RateLimited,
                    ApiError::new(
                        StatusCode::TOO_MANY_REQUESTS,
                        "Too many attempts. Try again later.",
                    ),
                ));
            }
            Ok(_) => {}
            Err(err) => tracing::error!("Rate limiter unavailable, not throttling: {:?}", err),
        }
    }

    let request = match LoginRequest::from_body(body) {
        Ok(request) => request,
        Err(_) => {
            register_failure(state, key.as_deref()).await;
            return Err((LoginOutcome::BadRequest, ApiError::bad_request("Invalid JSON")));
        }
    };

    let Some(passphrase) = request.passphrase else {
        register_failure(state, key.as_deref()).await;
        return Err((
            LoginOutcome::BadRequest,
            ApiError::bad_request("Passphrase required"),
        ));
    };

    let verifier = auth.clone();
    let verified = tokio::task::spawn_blocking(move || verifier.verify_passphrase(&passphrase)).await;

    match verified {
        Ok(Ok(true)) => {}
        Ok(Ok(false)) => {
            tracing::warn!("Admin login rejected: wrong passphrase");
            register_failure(state, key.as_deref()).await;
            return Err(invalid_credentials());
        }
        Ok(Err(err)) if err.is_misconfiguration() => {
            tracing::error!("Admin login misconfigured: {}", err);
            return Err((
                LoginOutcome::Misconfigured,
                ApiError::from_auth(&err, INVALID_CREDENTIALS),
            ));
        }
        Ok(Err(err)) => {
            tracing::warn!("Admin login failed: {}", err);
            register_failure(state, key.as_deref()).await;
            return Err((LoginOutcome::Invalid, ApiError::from_auth(&err, INVALID_CREDENTIALS)));
        }
        Err(err) => {
            tracing::error!("Passphrase verification task failed: {:?}", err);
            register_failure(state, key.as_deref()).await;
            return Err(invalid_credentials());
        }
    }

    if let Some(key) = key.as_deref() {
        if let Err(err) = state.rate_limiter().clear(key).await {
            tracing::error!("Failed to clear login attempts: {:?}", err);
        }
    }

    let set_cookie = auth.issue_session(&request.ua).map_err(|err| {
        tracing::error!("Admin login misconfigured: {}", err);
        (
            LoginOutcome::Misconfigured,
            ApiError::from_auth(&err, INVALID_CREDENTIALS),
        )
    })?;

    tracing::info!("Manager session issued");
    Ok(set_cookie)
}

async fn register_failure(state: &AppState, key: Option<&str>) {
    // ---
    let Some(key) = key else { return };

    if let Err(err) = state.rate_limiter().register_failure(key).await {
        tracing::error!("Failed to record login failure: {:?}", err);
    }
}

fn misconfigured() -> LoginFailure {
    (LoginOutcome::Misconfigured, ApiError::misconfigured())
}

fn invalid_credentials() -> LoginFailure {
    (
        LoginOutcome::Invalid,
        ApiError::new(StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS),
    )
}
