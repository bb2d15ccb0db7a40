//! Integration tests for the roster projection.

mod helpers;

use std::collections::BTreeSet;

use http::StatusCode;
use serde_json::Value;

fn names(body: &Value) -> BTreeSet<String> {
    body["data"]
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| e["display_name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_roster_is_exactly_the_members_in() {
    let app = helpers::TestApp::new();
    let a = app.register("a@example.com", Some("A")).await;
    let b = app.register("b@example.com", Some("B")).await;
    let c = app.register("c@example.com", Some("C")).await;

    // Interleaved across members on purpose.
    app.act(&a, "enter").await;
    app.act(&c, "enter").await;
    app.act(&b, "enter").await;
    app.act(&a, "exit").await;
    app.act(&c, "go_out").await;

    let response = app.request("GET", "/api/users", None, Some(&b)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(names(&response.body), BTreeSet::from(["B".to_string()]));

    let away = app
        .request("GET", "/api/users?status=away", None, Some(&b))
        .await;
    assert_eq!(names(&away.body), BTreeSet::from(["C".to_string()]));

    let out = app
        .request("GET", "/api/users?status=out", None, Some(&b))
        .await;
    assert_eq!(names(&out.body), BTreeSet::from(["A".to_string()]));
}

#[tokio::test]
async fn test_roster_reflects_accepted_action_immediately() {
    let app = helpers::TestApp::new();
    let token = app.register("solo@example.com", None).await;

    let before = app.request("GET", "/api/users", None, Some(&token)).await;
    assert!(names(&before.body).is_empty());

    app.act(&token, "enter").await;

    let after = app.request("GET", "/api/users", None, Some(&token)).await;
    assert_eq!(
        names(&after.body),
        BTreeSet::from(["solo@example.com".to_string()])
    );
}

#[tokio::test]
async fn test_rejected_action_does_not_change_roster() {
    let app = helpers::TestApp::new();
    let token = app.register("a@example.com", Some("A")).await;

    assert_eq!(app.act(&token, "return").await.status, StatusCode::CONFLICT);

    let response = app.request("GET", "/api/users", None, Some(&token)).await;
    assert!(names(&response.body).is_empty());
}

#[tokio::test]
async fn test_unknown_status_filter_is_rejected() {
    let app = helpers::TestApp::new();
    let token = app.register("a@example.com", None).await;

    let response = app
        .request("GET", "/api/users?status=asleep", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_roster_requires_a_token() {
    let app = helpers::TestApp::new();
    let response = app.request("GET", "/api/users", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
