//! Role administration endpoints.

use salvo::http::StatusCode;
use serde_json::json;
use test_log::test;

use super::helpers::{TestApp, TestRequest};

#[test(tokio::test)]
async fn seeded_roles_are_listed() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let roles = TestRequest::get("/api/roles")
        .bearer(&admin)
        .send(&app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    let names: Vec<&str> = roles
        .as_array()
        .expect("roles array")
        .iter()
        .filter_map(|r| r["name"].as_str())
        .collect();
    assert_eq!(names, ["ROLE_ADMIN", "ROLE_USER"]);
}

#[test(tokio::test)]
async fn create_role_validates_and_rejects_duplicates() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let created = TestRequest::post("/api/roles")
        .bearer(&admin)
        .json(json!({ "name": "ROLE_EDITOR" }))
        .send(&app)
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(created["name"], "ROLE_EDITOR");

    let _ = TestRequest::post("/api/roles")
        .bearer(&admin)
        .json(json!({ "name": "ROLE_EDITOR" }))
        .send(&app)
        .await
        .assert_error(StatusCode::CONFLICT, "AlreadyExists");

    let _ = TestRequest::post("/api/roles")
        .bearer(&admin)
        .json(json!({ "name": "editor" }))
        .send(&app)
        .await
        .assert_error(StatusCode::BAD_REQUEST, "ValidationFailed");
}

#[test(tokio::test)]
async fn assign_unknown_user_or_role_is_not_found() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let _ = app.user_token("alice").await;

    let _ = TestRequest::post("/api/roles/assign")
        .bearer(&admin)
        .json(json!({ "username": "ghost", "role": "ROLE_ADMIN" }))
        .send(&app)
        .await
        .assert_error(StatusCode::NOT_FOUND, "NotFound");

    let _ = TestRequest::post("/api/roles/assign")
        .bearer(&admin)
        .json(json!({ "username": "alice", "role": "ROLE_GHOST" }))
        .send(&app)
        .await
        .assert_error(StatusCode::NOT_FOUND, "NotFound");
}

#[test(tokio::test)]
async fn assigned_role_shows_up_in_the_profile() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let token = app.user_token("alice").await;

    let _ = TestRequest::post("/api/roles")
        .bearer(&admin)
        .json(json!({ "name": "ROLE_EDITOR" }))
        .send(&app)
        .await
        .assert_status(StatusCode::CREATED);

    let identity = TestRequest::post("/api/roles/assign")
        .bearer(&admin)
        .json(json!({ "username": "alice", "role": "ROLE_EDITOR" }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(identity["role_names"], json!(["ROLE_EDITOR", "ROLE_USER"]));

    let me = TestRequest::get("/api/users/me")
        .bearer(&token)
        .send(&app)
        .await
        .json();
    assert_eq!(me["role_names"], json!(["ROLE_EDITOR", "ROLE_USER"]));
}
