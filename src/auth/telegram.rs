//! Telegram Mini App `initData` verification.
//!
//! The client forwards the raw query string Telegram handed to the web app. It is
//! authentic when the HMAC-SHA256 of its canonical data-check string, keyed with
//! the configured web-app secret, equals the hex `hash` field it carries. Hex case
//! is not significant.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::compare::constant_time_eq;
use super::error::{AuthError, AuthResult};
use super::signer::HmacSigner;

/// The Telegram user behind a verified `initData` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelegramUser {
    // ---
    pub id: i64,

    /// Every other field Telegram supplied (names, language, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct InitDataVerifier {
    // ---
    signer: HmacSigner,
}

impl InitDataVerifier {
    // ---
    pub fn new(signer: HmacSigner) -> Self {
        // ---
        Self { signer }
    }

    pub fn verify(&self, init_data: &str) -> AuthResult<TelegramUser> {
        // ---
        if !self.signer.is_configured() {
            return Err(AuthError::MissingSecret("TELEGRAM_WEBAPP_SECRET"));
        }

        let mut params = parse_init_data(init_data);
        let hash = params
            .remove("hash")
            .filter(|h| !h.is_empty())
            .ok_or(AuthError::MissingHash)?;

        let claimed = hex::decode(&hash).map_err(|_| AuthError::InvalidHash)?;
        let computed = self.signer.sign(data_check_string(&params).as_bytes())?;
        if !constant_time_eq(&computed, &claimed) {
            return Err(AuthError::InvalidHash);
        }

        let user = params.get("user").ok_or(AuthError::InvalidUser)?;
        parse_user(user)
    }
}

/// Decodes the query string. A repeated key keeps its last value.
fn parse_init_data(init_data: &str) -> BTreeMap<String, String> {
    // ---
    let query = init_data.strip_prefix('?').unwrap_or(init_data);
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// `key=value` lines sorted by key, joined with `\n`.
pub fn data_check_string(params: &BTreeMap<String, String>) -> String {
    // ---
    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_user(raw: &str) -> AuthResult<TelegramUser> {
    // ---
    let Ok(Value::Object(mut fields)) = serde_json::from_str::<Value>(raw) else {
        return Err(AuthError::InvalidUser);
    };

    let id = fields
        .remove("id")
        .as_ref()
        .and_then(Value::as_i64)
        .ok_or(AuthError::InvalidUser)?;

    Ok(TelegramUser { id, extra: fields })
}
