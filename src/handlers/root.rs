use axum::response::IntoResponse;

pub async fn root_handler() -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        r#"Teacher ratings mini app API
Version: {version}

Available endpoints:
  - POST   /admin/login       - Exchange the admin passphrase for a session cookie
  - POST   /admin/logout      - Clear the session cookie
  - GET    /admin/me          - Check the current manager session
  - POST   /reviews           - Submit a review signed with Telegram initData
  - GET    /health            - Light health check
  - GET    /health?mode=full  - Full health check (includes the review store)
  - GET    /metrics           - Prometheus metrics
"#
    )
}
