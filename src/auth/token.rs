//! Minimal HS256 session token.
//!
//! Layout is `base64url(header).base64url(payload).base64url(signature)` where the
//! signature is HMAC-SHA256 over the first two segments. Only HS256 exists here, so
//! there is no algorithm field to negotiate and the header is never trusted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::base64url;
use super::compare::constant_time_eq;
use super::error::{AuthError, AuthResult};
use super::signer::HmacSigner;

/// The only role this service issues.
pub const MANAGER_ROLE: &str = "manager";

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    // ---
    pub role: String,

    /// HMAC of the user agent that obtained the token.
    pub ua_hash: String,

    /// Issued-at, unix seconds.
    pub iat: i64,

    /// Expiry, unix seconds. The token is valid while `exp > now`.
    pub exp: i64,
}

#[derive(Serialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
}

const HEADER: Header = Header {
    alg: "HS256",
    typ: "JWT",
};

/// Issues and verifies session tokens with the server HMAC secret.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    // ---
    signer: HmacSigner,
}

impl TokenCodec {
    // ---
    pub fn new(signer: HmacSigner) -> Self {
        // ---
        Self { signer }
    }

    pub fn issue(&self, role: &str, fingerprint: &str, ttl_seconds: i64) -> AuthResult<String> {
        // ---
        self.issue_at(role, fingerprint, ttl_seconds, unix_now())
    }

    pub fn issue_at(
        &self,
        role: &str,
        fingerprint: &str,
        ttl_seconds: i64,
        now: i64,
    ) -> AuthResult<String> {
        // ---
        let claims = SessionClaims {
            role: role.to_string(),
            ua_hash: fingerprint.to_string(),
            iat: now,
            exp: now.saturating_add(ttl_seconds),
        };

        // Serializing plain structs of strings and integers cannot fail
        let header = serde_json::to_vec(&HEADER).map_err(|_| AuthError::MalformedToken)?;
        let payload = serde_json::to_vec(&claims).map_err(|_| AuthError::MalformedToken)?;

        let signing_input = format!("{}.{}", base64url::encode(header), base64url::encode(payload));
        let signature = base64url::encode(self.signer.sign(signing_input.as_bytes())?);

        Ok(format!("{signing_input}.{signature}"))
    }

    pub fn verify(
        &self,
        token: &str,
        expected_role: &str,
        fingerprint: &str,
    ) -> AuthResult<SessionClaims> {
        // ---
        self.verify_at(token, expected_role, fingerprint, unix_now())
    }

    /// Verifies `token` as of `now`.
    ///
    /// Checks run in a fixed order and the first failure is returned. Callers must
    /// not reveal which one failed.
    pub fn verify_at(
        &self,
        token: &str,
        expected_role: &str,
        fingerprint: &str,
        now: i64,
    ) -> AuthResult<SessionClaims> {
        // ---
        let segments: Vec<&str> = token.split('.').collect();
        let [header, payload, signature] = segments.as_slice() else {
            return Err(AuthError::MalformedToken);
        };

        let signing_input = format!("{header}.{payload}");
        let expected = base64url::encode(self.signer.sign(signing_input.as_bytes())?);
        if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
            return Err(AuthError::BadSignature);
        }

        let raw = base64url::decode(payload)?;
        let claims: Value = serde_json::from_slice(&raw).map_err(|_| AuthError::MalformedToken)?;

        let role = claims.get("role").and_then(Value::as_str);
        if role != Some(expected_role) {
            return Err(AuthError::RoleMismatch);
        }

        let exp = claims
            .get("exp")
            .and_then(Value::as_f64)
            .ok_or(AuthError::Expired)?;
        if exp <= now as f64 {
            return Err(AuthError::Expired);
        }

        let ua_hash = claims.get("ua_hash").and_then(Value::as_str);
        if ua_hash != Some(fingerprint) {
            return Err(AuthError::FingerprintMismatch);
        }

        Ok(SessionClaims {
            role: expected_role.to_string(),
            ua_hash: fingerprint.to_string(),
            iat: claims.get("iat").and_then(Value::as_i64).unwrap_or_default(),
            exp: exp as i64,
        })
    }
}

pub(crate) fn unix_now() -> i64 {
    // ---
    chrono::Utc::now().timestamp()
}
