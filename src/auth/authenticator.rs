//! The two contracts the rest of the service uses: issue a session for a verified
//! admin, and validate the session attached to a request. Telegram identity checks
//! and login throttling keys live here too since they share the server secret.

use axum::http::{header, HeaderMap};

use super::cookie::SessionCookie;
use super::error::{AuthError, AuthResult};
use super::passphrase::PassphraseVerifier;
use super::signer::HmacSigner;
use super::telegram::{InitDataVerifier, TelegramUser};
use super::token::{SessionClaims, TokenCodec, MANAGER_ROLE};
use crate::config::{AuthConfig, TelegramConfig};

#[derive(Debug, Clone)]
pub struct Authenticator {
    // ---
    signer: HmacSigner,
    tokens: TokenCodec,
    passphrase: PassphraseVerifier,
    telegram: InitDataVerifier,
    cookie: SessionCookie,
    session_ttl_secs: i64,
}

impl Authenticator {
    // ---
    pub fn from_config(auth: &AuthConfig, telegram: &TelegramConfig) -> Self {
        // ---
        let signer = HmacSigner::new(auth.hmac_secret.as_deref(), "HMAC_SECRET");
        let telegram_signer =
            HmacSigner::new(telegram.webapp_secret.as_deref(), "TELEGRAM_WEBAPP_SECRET");

        if !signer.is_configured() {
            tracing::warn!("HMAC_SECRET is not set; admin login and reviews will fail");
        }

        Self {
            tokens: TokenCodec::new(signer.clone()),
            signer,
            passphrase: PassphraseVerifier::from_config(auth.passphrase_hash.as_deref()),
            telegram: InitDataVerifier::new(telegram_signer),
            cookie: SessionCookie::new(auth.cookie_name.clone(), auth.cookie_domain.clone()),
            session_ttl_secs: i64::try_from(auth.session_ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Whether `HMAC_SECRET` is set. Login refuses to start without it.
    pub fn has_server_secret(&self) -> bool {
        // ---
        self.signer.is_configured()
    }

    pub fn session_ttl_secs(&self) -> i64 {
        // ---
        self.session_ttl_secs
    }

    /// `HMAC-SHA256(secret, user_agent)` hex, binding a token to one browser profile.
    pub fn fingerprint(&self, user_agent: &str) -> AuthResult<String> {
        // ---
        self.signer.sign_hex(user_agent.as_bytes())
    }

    /// Rate-limit key for the requesting client.
    ///
    /// Built from the first `x-forwarded-for` address and the user agent. `None`
    /// when the request carries neither.
    pub fn client_key(&self, headers: &HeaderMap) -> AuthResult<Option<String>> {
        // ---
        let ip = header_str(headers, "x-forwarded-for")
            .and_then(|forwarded| forwarded.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());
        let ua = header_str(headers, header::USER_AGENT.as_str()).unwrap_or_default();

        let raw = match ip {
            Some(ip) => format!("{ip}|{ua}"),
            None if ua.is_empty() => return Ok(None),
            None => ua.to_string(),
        };

        self.signer.sign_hex(raw.as_bytes()).map(Some)
    }

    /// Blocking; run it off the async executor.
    pub fn verify_passphrase(&self, passphrase: &str) -> AuthResult<bool> {
        // ---
        self.passphrase.verify(passphrase)
    }

    /// Issues a manager token bound to `user_agent` and wraps it in a `Set-Cookie` value.
    pub fn issue_session(&self, user_agent: &str) -> AuthResult<String> {
        // ---
        let fingerprint = self.fingerprint(user_agent)?;
        let token = self
            .tokens
            .issue(MANAGER_ROLE, &fingerprint, self.session_ttl_secs)?;

        self.cookie.issue(&token, self.session_ttl_secs)
    }

    /// `Set-Cookie` value that ends the session.
    pub fn clear_session(&self) -> AuthResult<String> {
        // ---
        self.cookie.clear()
    }

    /// Validates the manager session carried by `headers`.
    pub fn validate_session(&self, headers: &HeaderMap) -> AuthResult<SessionClaims> {
        // ---
        let token = self.cookie.read(headers).ok_or(AuthError::MissingCookie)?;
        let ua = header_str(headers, header::USER_AGENT.as_str()).unwrap_or_default();
        let fingerprint = self.fingerprint(ua)?;

        self.tokens.verify(&token, MANAGER_ROLE, &fingerprint)
    }

    pub fn verify_init_data(&self, init_data: &str) -> AuthResult<TelegramUser> {
        // ---
        self.telegram.verify(init_data)
    }

    /// One-way digest of a Telegram user id, the only form that reaches storage.
    pub fn user_hash(&self, telegram_id: i64) -> AuthResult<String> {
        // ---
        self.signer.sign_hex(telegram_id.to_string().as_bytes())
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    // ---
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use axum::http::HeaderValue;
    use std::time::Duration;

    fn auth_config() -> AuthConfig {
        // ---
        AuthConfig {
            hmac_secret: Some("server-secret".to_string()),
            passphrase_hash: None,
            cookie_name: "__mgr".to_string(),
            cookie_domain: Some("example.com".to_string()),
            session_ttl: Duration::from_secs(1800),
        }
    }

    fn authenticator(auth: AuthConfig) -> Authenticator {
        // ---
        Authenticator::from_config(&auth, &TelegramConfig { webapp_secret: None })
    }

    /// Pulls the token back out of a `Set-Cookie` value.
    fn token_from(set_cookie: &str) -> String {
        // ---
        let first = set_cookie.split(';').next().unwrap();
        first.split_once('=').unwrap().1.to_string()
    }

    fn request_headers(token: &str, ua: &str) -> HeaderMap {
        // ---
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("__mgr={token}")).unwrap(),
        );
        headers.insert(header::USER_AGENT, HeaderValue::from_str(ua).unwrap());
        headers
    }

    #[test]
    fn issued_session_validates_for_same_user_agent() {
        // ---
        let auth = authenticator(auth_config());
        let token = token_from(&auth.issue_session("Firefox/130").unwrap());

        let claims = auth
            .validate_session(&request_headers(&token, "Firefox/130"))
            .unwrap();
        assert_eq!(claims.role, MANAGER_ROLE);
        assert_eq!(claims.exp - claims.iat, 1800);
    }

    #[test]
    fn session_from_other_user_agent_is_rejected() {
        // ---
        let auth = authenticator(auth_config());
        let token = token_from(&auth.issue_session("Firefox/130").unwrap());

        assert_eq!(
            auth.validate_session(&request_headers(&token, "curl/8.0")),
            Err(AuthError::FingerprintMismatch)
        );
    }

    #[test]
    fn missing_cookie_is_rejected() {
        // ---
        let auth = authenticator(auth_config());
        assert_eq!(
            auth.validate_session(&HeaderMap::new()),
            Err(AuthError::MissingCookie)
        );
    }

    #[test]
    fn client_key_prefers_forwarded_ip() {
        // ---
        let auth = authenticator(auth_config());

        let mut headers = HeaderMap::new();
        assert_eq!(auth.client_key(&headers), Ok(None));

        headers.insert(header::USER_AGENT, HeaderValue::from_static("ua"));
        let ua_only = auth.client_key(&headers).unwrap().unwrap();
        assert_eq!(ua_only, auth.fingerprint("ua").unwrap());

        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 172.16.0.1"));
        let with_ip = auth.client_key(&headers).unwrap().unwrap();
        assert_eq!(with_ip, auth.fingerprint("10.0.0.1|ua").unwrap());
    }

    #[test]
    fn user_hash_is_stable_and_opaque() {
        // ---
        let auth = authenticator(auth_config());
        let hash = auth.user_hash(42).unwrap();

        assert_eq!(hash.len(), 64);
        assert_eq!(hash, auth.user_hash(42).unwrap());
        assert_ne!(hash, auth.user_hash(43).unwrap());
        assert_eq!(hash, auth.fingerprint("42").unwrap());
    }

    #[test]
    fn missing_secret_surfaces_as_configuration_error() {
        // ---
        let auth = authenticator(AuthConfig {
            hmac_secret: None,
            ..auth_config()
        });

        assert!(!auth.has_server_secret());
        let err = auth.issue_session("ua").unwrap_err();
        assert!(err.is_misconfiguration());
        assert!(auth
            .validate_session(&request_headers("a.b.c", "ua"))
            .unwrap_err()
            .is_misconfiguration());
    }
}
