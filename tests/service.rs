use axum::http::{header, StatusCode};
use miniapp_auth::MetricsType;
use serial_test::serial;

mod common;
use common::*;

#[tokio::test]
async fn root_lists_endpoints() {
    // ---
    let router = router(test_config());

    let response = send(&router, get_with_cookie("/", None, UA)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains(env!("CARGO_PKG_VERSION")));
    assert!(text.contains("/admin/login"));
    assert!(text.contains("/reviews"));
}

#[tokio::test]
async fn health_endpoint_works() {
    // ---
    let router = router(test_config());

    for path in ["/health", "/health?mode=full"] {
        let response = send(&router, get_with_cookie(path, None, UA)).await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
        assert_eq!(body_json(response).await["status"], "ok");
    }
}

#[tokio::test]
async fn noop_metrics_render_empty() {
    // ---
    let router = router(test_config());

    let response = send(&router, get_with_cookie("/metrics", None, UA)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());
}

// NOTE: Prometheus uses a process-global recorder. Tests touching it are serial.
#[tokio::test]
#[serial]
async fn metrics_endpoint_with_prometheus() {
    // ---
    let mut config = test_config();
    config.server.metrics_type = MetricsType::Prom;
    let router = router(config);

    send(&router, login_request("203.0.113.90", "wrong")).await;
    send(&router, login_request("203.0.113.90", PASSPHRASE)).await;
    send(&router, get_with_cookie("/admin/me", None, UA)).await;
    send(&router, get_with_cookie("/health", None, UA)).await;

    let response = send(&router, get_with_cookie("/metrics", None, UA)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    println!("Metrics response body: '{body}'");

    assert!(body.contains("admin_login_attempts_total"));
    assert!(body.contains(r#"outcome="invalid""#));
    assert!(body.contains(r#"outcome="success""#));
    assert!(body.contains("admin_session_checks_total"));
    assert!(body.contains("http_request_duration_seconds"));
    assert!(body.contains(r#"path="/admin/login""#));
}

/// Full manager flow over a real socket.
#[tokio::test]
#[serial]
async fn manager_session_lifecycle() {
    // ---
    let server = TestServer::new(test_config()).await;

    let response = server
        .client
        .post(server.url("/admin/login"))
        .header(header::USER_AGENT, UA)
        .json(&serde_json::json!({ "passphrase": PASSPHRASE, "ua": UA }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status().as_u16(), 204);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Set-Cookie header")
        .to_str()
        .unwrap()
        .to_string();
    let cookie = cookie_pair(&set_cookie);

    let me = |cookie: Option<String>| {
        let mut request = server
            .client
            .get(server.url("/admin/me"))
            .header(header::USER_AGENT, UA);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        request.send()
    };

    let response = me(Some(cookie.clone())).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["role"], "manager");

    let response = server
        .client
        .post(server.url("/admin/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    // The browser replaces its cookie with the cleared one
    let response = me(Some(cookie_pair(&cleared))).await.unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let response = me(None).await.unwrap();
    assert_eq!(response.status().as_u16(), 401);
}
