//! Integration tests for registration, token issuance, and the profile.

mod helpers;

use http::StatusCode;

#[tokio::test]
async fn test_register_returns_member_and_token() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/users",
            Some(serde_json::json!({
                "email": "Hanako@Example.com",
                "password": "password123",
                "display_name": "Hanako",
                "original_id": "s-042",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["success"], true);
    let member = &response.data()["member"];
    assert_eq!(member["email"], "hanako@example.com");
    assert_eq!(member["status"], "out");
    assert_eq!(member["color_code"], "#3b82f6");
    assert!(member.get("password_hash").is_none());
    assert_eq!(response.data()["token"]["token_type"], "bearer");
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = helpers::TestApp::new();
    app.register("a@example.com", None).await;

    let response = app
        .request(
            "POST",
            "/api/users",
            Some(serde_json::json!({ "email": "A@example.com", "password": "password123" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_invalid_email_is_rejected() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/users",
            Some(serde_json::json!({ "email": "not-an-email", "password": "password123" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_token_endpoint_accepts_form_login() {
    let app = helpers::TestApp::new();
    app.register("a@example.com", None).await;

    let response = app
        .request_form("/api/token", "username=a%40example.com&password=password123")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let token = response.data()["access_token"].as_str().unwrap().to_string();

    let me = app.request("GET", "/api/users/me", None, Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.data()["email"], "a@example.com");
}

#[tokio::test]
async fn test_token_endpoint_rejects_wrong_password() {
    let app = helpers::TestApp::new();
    app.register("a@example.com", None).await;

    let response = app
        .request_form("/api/token", "username=a%40example.com&password=nope-nope")
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthenticated() {
    let app = helpers::TestApp::new();

    let missing = app.request("GET", "/api/users/me", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let garbage = app
        .request("GET", "/api/users/me", None, Some("garbage"))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_update_never_touches_status() {
    let app = helpers::TestApp::new();
    let token = app.register("a@example.com", None).await;
    app.act(&token, "enter").await;

    let response = app
        .request(
            "PUT",
            "/api/users/me",
            Some(serde_json::json!({
                "display_name": "Aiko",
                "color_code": "#ef4444",
                "status": "out",
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["display_name"], "Aiko");
    assert_eq!(response.data()["color_code"], "#ef4444");
    assert_eq!(response.data()["status"], "in");
}

#[tokio::test]
async fn test_health_reports_store() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["store"], "memory");
}
