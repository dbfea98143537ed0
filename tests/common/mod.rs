// Test helpers are intentionally partially used
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use miniapp_auth::auth::{data_check_string, HmacSigner};
use miniapp_auth::domain::RateLimitPolicy;
use miniapp_auth::{
    build_router, AppConfig, AuthConfig, MetricsType, RateLimitBackend, RateLimitConfig,
    ReviewStoreConfig, ServerConfig, TelegramConfig,
};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;
use tower::ServiceExt;

pub const HMAC_SECRET: &str = "integration-hmac-secret";
pub const TELEGRAM_SECRET: &str = "integration-telegram-secret";
pub const PASSPHRASE: &str = "correct horse battery staple";
pub const UA: &str = "Mozilla/5.0 (X11; Linux x86_64) integration";
pub const COOKIE_DOMAIN: &str = "example.com";

/// `scrypt$N$r$p$salt$key` record for [`PASSPHRASE`], with a small N so tests stay fast.
pub static SCRYPT_HASH: Lazy<String> = Lazy::new(|| scrypt_hash(PASSPHRASE, b"integration-salt"));

pub fn scrypt_hash(passphrase: &str, salt: &[u8]) -> String {
    // ---
    let params = scrypt::Params::new(10, 8, 1, 32).unwrap();
    let mut key = [0u8; 32];
    scrypt::scrypt(passphrase.as_bytes(), salt, &params, &mut key).unwrap();

    format!(
        "scrypt$1024$8$1${}${}",
        STANDARD.encode(salt),
        STANDARD.encode(key)
    )
}

/// Argon2id PHC string for `passphrase` with minimal cost parameters.
pub fn argon2_hash(passphrase: &str) -> String {
    // ---
    use argon2::password_hash::{PasswordHasher, SaltString};
    use argon2::{Algorithm, Argon2, Params, Version};

    let argon = Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(1024, 1, 1, None).unwrap(),
    );
    let salt = SaltString::from_b64("c29tZXNhbHRzb21lc2FsdA").unwrap();
    argon
        .hash_password(passphrase.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

/// A fully configured service: every secret set, memory backends, teachers 1..=3.
pub fn test_config() -> AppConfig {
    // ---
    AppConfig {
        server: ServerConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            metrics_type: MetricsType::Noop,
        },
        auth: AuthConfig {
            hmac_secret: Some(HMAC_SECRET.to_string()),
            passphrase_hash: Some(SCRYPT_HASH.clone()),
            cookie_name: "__mgr".to_string(),
            cookie_domain: Some(COOKIE_DOMAIN.to_string()),
            session_ttl: Duration::from_secs(30 * 60),
        },
        telegram: TelegramConfig {
            webapp_secret: Some(TELEGRAM_SECRET.to_string()),
        },
        rate_limit: RateLimitConfig {
            backend: RateLimitBackend::Memory,
            policy: RateLimitPolicy::default(),
        },
        review_store: ReviewStoreConfig::Memory {
            teacher_ids: vec![1, 2, 3],
        },
    }
}

pub fn router(config: AppConfig) -> Router {
    // ---
    build_router(config).expect("Should be able to create router")
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    // ---
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    // ---
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Asserts the `{"error": ...}` body and status of a rejected request.
pub async fn assert_error(response: Response<Body>, status: StatusCode, message: &str) {
    // ---
    assert_eq!(response.status(), status);
    let body = body_json(response).await;
    assert_eq!(body["error"], message, "body was {body}");
}

// ============================================================================
// Request builders
// ============================================================================

pub fn json_post(path: &str, body: impl Into<Body>) -> Request<Body> {
    // ---
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::USER_AGENT, UA)
        .body(body.into())
        .unwrap()
}

/// Login from `ip` with the default user agent.
pub fn login_request(ip: &str, passphrase: &str) -> Request<Body> {
    // ---
    let body = serde_json::json!({ "passphrase": passphrase, "ua": UA }).to_string();
    let mut request = json_post("/admin/login", body);
    request
        .headers_mut()
        .insert("x-forwarded-for", format!("{ip}, 10.0.0.1").parse().unwrap());
    request
}

pub fn get_with_cookie(path: &str, cookie: Option<&str>, ua: &str) -> Request<Body> {
    // ---
    let mut builder = Request::builder()
        .method("GET")
        .uri(path)
        .header(header::USER_AGENT, ua);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// The `Set-Cookie` header of a response.
pub fn set_cookie(response: &Response<Body>) -> String {
    // ---
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Set-Cookie header")
        .to_str()
        .unwrap()
        .to_string()
}

/// `name=value` pair of a `Set-Cookie` value, ready for a `Cookie` header.
pub fn cookie_pair(set_cookie: &str) -> String {
    // ---
    set_cookie.split(';').next().unwrap().trim().to_string()
}

/// Logs in from a fresh client and returns the cookie pair.
pub async fn login(router: &Router) -> String {
    // ---
    let response = send(router, login_request("198.51.100.7", PASSPHRASE)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    cookie_pair(&set_cookie(&response))
}

// ============================================================================
// Telegram initData
// ============================================================================

/// Builds `initData` for `fields`, signed with `secret` the way the Telegram
/// client does.
pub fn signed_init_data(fields: &[(&str, &str)], secret: &str) -> String {
    // ---
    let params: BTreeMap<String, String> = fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let hash = HmacSigner::new(Some(secret), "test")
        .sign_hex(data_check_string(&params).as_bytes())
        .unwrap();

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (k, v) in fields {
        serializer.append_pair(k, v);
    }
    serializer.append_pair("hash", &hash);
    serializer.finish()
}

/// Signed `initData` for Telegram user `user_id`.
pub fn init_data_for(user_id: i64) -> String {
    // ---
    let user = format!(r#"{{"id":{user_id},"first_name":"Ada"}}"#);
    signed_init_data(
        &[("auth_date", "1700000000"), ("query_id", "AAH"), ("user", &user)],
        TELEGRAM_SECRET,
    )
}

// ============================================================================
// Socket-level server
// ============================================================================

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
}

impl TestServer {
    // ---
    pub async fn new(config: AppConfig) -> Self {
        // --
        let app = router(config);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start
        sleep(Duration::from_millis(100)).await;

        let client = Client::new();

        Self { addr, client }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }
}
