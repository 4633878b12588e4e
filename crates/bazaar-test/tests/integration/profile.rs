//! The caller's own account.

use salvo::http::StatusCode;
use serde_json::json;
use test_log::test;

use super::helpers::{TestApp, TestRequest};

#[test(tokio::test)]
async fn profile_hides_the_password_hash() {
    let app = TestApp::new().await;
    let token = app.user_token("alice").await;

    let me = TestRequest::get("/api/users/me")
        .bearer(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);

    assert!(!me.body.contains("password"));
    assert!(!me.body.contains("argon2"));
    assert_eq!(me.json()["email"], "alice@example.com");
}

#[test(tokio::test)]
async fn password_change_takes_effect_on_next_login() {
    let app = TestApp::new().await;
    let token = app.user_token("alice").await;

    let _ = TestRequest::put("/api/users/me")
        .bearer(&token)
        .json(json!({ "password": "n3w-secret" }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK);

    let _ = app
        .login("alice", "passw0rd")
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "InvalidCredentials");
    let _ = app
        .login("alice", "n3w-secret")
        .await
        .assert_status(StatusCode::OK);
}

#[test(tokio::test)]
async fn email_change_is_validated_and_unique() {
    let app = TestApp::new().await;
    let token = app.user_token("alice").await;
    let _ = app.user_token("bob").await;

    let _ = TestRequest::put("/api/users/me")
        .bearer(&token)
        .json(json!({ "email": "nope" }))
        .send(&app)
        .await
        .assert_error(StatusCode::BAD_REQUEST, "ValidationFailed");

    let _ = TestRequest::put("/api/users/me")
        .bearer(&token)
        .json(json!({ "email": "bob@example.com" }))
        .send(&app)
        .await
        .assert_error(StatusCode::CONFLICT, "AlreadyExists");

    let updated = TestRequest::put("/api/users/me")
        .bearer(&token)
        .json(json!({ "email": "alice@shop.example" }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(updated["email"], "alice@shop.example");
}

#[test(tokio::test)]
async fn deleted_account_cannot_log_in() {
    let app = TestApp::new().await;
    let token = app.user_token("alice").await;

    let _ = TestRequest::delete("/api/users/me")
        .bearer(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let _ = app
        .login("alice", "passw0rd")
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "InvalidCredentials");
}
