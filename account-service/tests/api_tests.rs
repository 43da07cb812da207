mod common;

use std::net::IpAddr;

use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_register_account() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "email": "alice@example.com",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 201);
    assert!(body["data"]["id"].is_string());
}

#[tokio::test]
async fn test_register_duplicate_email_is_conflict() {
    let app = TestApp::spawn().await;
    app.register("alice@example.com", "password123").await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "email": "ALICE@example.com",
            "password": "another-password"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_invalid_email() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "email": "not-an-email",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::spawn().await;
    app.register("alice@example.com", "password123").await;

    let response = app
        .post("/api/auth/login")
        .json(&json!({
            "email": "alice@example.com",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["access_token"].is_string());
    assert!(body["data"]["refresh_token"].is_string());
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert_eq!(body["data"]["expires_in"], 900);
}

#[tokio::test]
async fn test_login_failures_share_one_message() {
    let app = TestApp::spawn().await;
    app.register("alice@example.com", "password123").await;

    let mut messages = Vec::new();
    for (email, password) in [
        ("alice@example.com", "wrong-password"),
        ("nobody@example.com", "password123"),
    ] {
        let response = app
            .post("/api/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        messages.push(body["data"]["message"].clone());
    }

    assert_eq!(messages[0], "Authentication failed");
    assert_eq!(messages[0], messages[1]);
}

#[tokio::test]
async fn test_me_with_access_token() {
    let app = TestApp::spawn().await;
    let id = app.register("alice@example.com", "password123").await;
    let (access_token, _) = app.login("alice@example.com", "password123").await;

    let response = app
        .get_authenticated("/api/auth/me", &access_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["account_id"], id);
    assert_eq!(body["data"]["role"], "user");
}

#[tokio::test]
async fn test_me_without_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/auth/me")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_rotates_and_rejects_replay() {
    let app = TestApp::spawn().await;
    app.register("alice@example.com", "password123").await;
    let (_, refresh_token) = app.login("alice@example.com", "password123").await;

    let response = app
        .post("/api/auth/refresh")
        .json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    let rotated = body["data"]["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(rotated, refresh_token);

    let replay = app
        .post("/api/auth/refresh")
        .json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = replay.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "Authentication failed");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::spawn().await;
    app.register("alice@example.com", "password123").await;
    let (_, refresh_token) = app.login("alice@example.com", "password123").await;

    let response = app
        .post("/api/auth/logout")
        .json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let refresh = app
        .post("/api/auth/refresh")
        .json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);

    let second_logout = app
        .post("/api/auth/logout")
        .json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(second_logout.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_sessions_records_client() {
    let app = TestApp::spawn().await;
    app.register("alice@example.com", "password123").await;

    let response = app
        .post("/api/auth/login")
        .header("user-agent", "integration-test")
        .json(&json!({
            "email": "alice@example.com",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let (access_token, _) = app.login("alice@example.com", "password123").await;

    let response = app
        .get_authenticated("/api/auth/sessions", &access_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    let sessions = body["data"].as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    assert!(sessions.iter().all(|s| s["ip"] == "127.0.0.1"));
    assert!(sessions
        .iter()
        .any(|s| s["user_agent"] == "integration-test"));
}

async fn session_ips(app: &TestApp, forwarded_for: &str) -> Vec<serde_json::Value> {
    app.register("alice@example.com", "password123").await;
    let response = app
        .post("/api/auth/login")
        .header("x-forwarded-for", forwarded_for)
        .json(&json!({
            "email": "alice@example.com",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    let access_token = body["data"]["access_token"].as_str().unwrap().to_string();

    let response = app
        .get_authenticated("/api/auth/sessions", &access_token)
        .send()
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["ip"].clone())
        .collect()
}

#[tokio::test]
async fn test_forwarded_for_ignored_from_untrusted_peer() {
    let app = TestApp::spawn().await;

    let ips = session_ips(&app, "203.0.113.7").await;
    assert_eq!(ips, vec![json!("127.0.0.1")]);
}

#[tokio::test]
async fn test_forwarded_for_honoured_from_trusted_proxy() {
    let app = TestApp::spawn_behind_proxy(vec![IpAddr::from([127, 0, 0, 1])]).await;

    let ips = session_ips(&app, "203.0.113.7, 10.0.0.1").await;
    assert_eq!(ips, vec![json!("203.0.113.7")]);
}

#[tokio::test]
async fn test_admin_routes_forbidden_for_users() {
    let app = TestApp::spawn().await;
    let id = app.register("alice@example.com", "password123").await;
    let (access_token, _) = app.login("alice@example.com", "password123").await;

    let response = app
        .put_authenticated(&format!("/api/accounts/{}/role", id), &access_token)
        .json(&json!({ "role": "admin" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_assigns_role() {
    let app = TestApp::spawn().await;
    let admin_token = app.admin_token("admin@example.com").await;
    let id = app.register("alice@example.com", "password123").await;

    let response = app
        .put_authenticated(&format!("/api/accounts/{}/role", id), &admin_token)
        .json(&json!({ "role": "ADMIN" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["account_id"], id);
    assert_eq!(body["data"]["role"], "admin");

    let invalid = app
        .put_authenticated(&format!("/api/accounts/{}/role", id), &admin_token)
        .json(&json!({ "role": "owner" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_admin_blocks_account() {
    let app = TestApp::spawn().await;
    let admin_token = app.admin_token("admin@example.com").await;
    let id = app.register("alice@example.com", "password123").await;
    let (access_token, refresh_token) = app.login("alice@example.com", "password123").await;

    let response = app
        .post_authenticated(&format!("/api/accounts/{}/block", id), &admin_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["revoked_sessions"], 1);

    let me = app
        .get_authenticated("/api/auth/me", &access_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);

    let refresh = app
        .post("/api/auth/refresh")
        .json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_revokes_sessions_of_unknown_account() {
    let app = TestApp::spawn().await;
    let admin_token = app.admin_token("admin@example.com").await;

    let response = app
        .post_authenticated(
            "/api/accounts/00000000-0000-0000-0000-000000000000/sessions/revoke",
            &admin_token,
        )
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_verifies_email() {
    let app = TestApp::spawn().await;
    let admin_token = app.admin_token("admin@example.com").await;
    let id = app.register("alice@example.com", "password123").await;

    let response = app
        .post_authenticated(&format!("/api/accounts/{}/verify-email", id), &admin_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let account_id =
        account_service::domain::account::models::AccountId::from_string(&id).unwrap();
    assert!(app.services.accounts.get(&account_id).unwrap().email_verified);
}
