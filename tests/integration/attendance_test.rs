//! Integration tests for presence actions and attendance history.

mod helpers;

use http::StatusCode;

#[tokio::test]
async fn test_enter_twice_is_rejected() {
    let app = helpers::TestApp::new();
    let token = app.register("a@example.com", None).await;

    let first = app.act(&token, "enter").await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.data()["action"], "enter");
    assert_eq!(first.data()["place"], "room");

    let second = app.act(&token, "enter").await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["error"], "INVALID_TRANSITION");
    assert_eq!(second.body["details"]["current_status"], "in");
    assert_eq!(second.body["details"]["action"], "enter");

    assert_eq!(app.logs(&token).await.len(), 1);
    let me = app.request("GET", "/api/users/me", None, Some(&token)).await;
    assert_eq!(me.data()["status"], "in");
}

#[tokio::test]
async fn test_away_blocks_exit_until_return() {
    let app = helpers::TestApp::new();
    let token = app.register("a@example.com", None).await;
    app.act(&token, "enter").await;

    assert_eq!(app.act(&token, "go_out").await.status, StatusCode::CREATED);

    let exit = app.act(&token, "exit").await;
    assert_eq!(exit.status, StatusCode::CONFLICT);
    assert_eq!(exit.body["details"]["current_status"], "away");

    assert_eq!(app.act(&token, "return").await.status, StatusCode::CREATED);

    let me = app.request("GET", "/api/users/me", None, Some(&token)).await;
    assert_eq!(me.data()["status"], "in");
}

#[tokio::test]
async fn test_history_is_newest_first() {
    let app = helpers::TestApp::new();
    let token = app.register("a@example.com", None).await;

    for action in ["enter", "go_out", "return", "exit"] {
        assert_eq!(app.act(&token, action).await.status, StatusCode::CREATED);
    }

    let actions: Vec<_> = app
        .logs(&token)
        .await
        .iter()
        .map(|e| e["action"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(actions, vec!["exit", "return", "go_out", "enter"]);
}

#[tokio::test]
async fn test_new_member_has_empty_history() {
    let app = helpers::TestApp::new();
    let token = app.register("a@example.com", None).await;

    assert!(app.logs(&token).await.is_empty());
}

#[tokio::test]
async fn test_place_and_note_are_recorded() {
    let app = helpers::TestApp::new();
    let token = app.register("a@example.com", None).await;

    let response = app
        .request(
            "POST",
            "/api/users/me/logs",
            Some(serde_json::json!({
                "action": "enter",
                "place": "lab-2",
                "note": "seminar prep",
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.data()["place"], "lab-2");
    assert_eq!(response.data()["note"], "seminar prep");
}

#[tokio::test]
async fn test_over_long_place_is_rejected() {
    let app = helpers::TestApp::new();
    let token = app.register("a@example.com", None).await;

    let response = app
        .request(
            "POST",
            "/api/users/me/logs",
            Some(serde_json::json!({ "action": "enter", "place": "x".repeat(65) })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.logs(&token).await.is_empty());
}

#[tokio::test]
async fn test_actions_require_a_token() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/users/me/logs",
            Some(serde_json::json!({ "action": "enter" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_actions_only_touch_the_caller() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice@example.com", None).await;
    let bob = app.register("bob@example.com", None).await;

    app.act(&alice, "enter").await;

    assert_eq!(app.logs(&alice).await.len(), 1);
    assert!(app.logs(&bob).await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_exit_and_go_out_accept_one() {
    let app = helpers::TestApp::new();
    let token = app.register("a@example.com", None).await;
    app.act(&token, "enter").await;

    let (exit, go_out) = tokio::join!(app.act(&token, "exit"), app.act(&token, "go_out"));

    let statuses = [exit.status, go_out.status];
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::CREATED).count(),
        1
    );
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count(),
        1
    );
    assert_eq!(app.logs(&token).await.len(), 2);
}
