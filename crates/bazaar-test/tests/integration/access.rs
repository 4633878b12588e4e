//! Route protection applied by the access policy.

use salvo::http::StatusCode;
use serde_json::json;
use test_log::test;

use super::helpers::{TestApp, TestRequest};

#[test(tokio::test)]
async fn healthcheck_is_public() {
    let app = TestApp::new().await;

    let response = TestRequest::get("/api/healthcheck")
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(response.text(), "OK");
}

#[test(tokio::test)]
async fn catalog_reads_require_a_session() {
    let app = TestApp::new().await;

    let _ = TestRequest::get("/api/categories")
        .send(&app)
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "Unauthorized");

    let token = app.user_token("alice").await;
    let _ = TestRequest::get("/api/categories")
        .bearer(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
}

#[test(tokio::test)]
async fn catalog_writes_require_the_admin_role() {
    let app = TestApp::new().await;
    let body = json!({ "name": "Books", "description": null });

    let _ = TestRequest::post("/api/categories")
        .json(body.clone())
        .send(&app)
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "Unauthorized");

    let token = app.user_token("alice").await;
    let _ = TestRequest::post("/api/categories")
        .bearer(&token)
        .json(body.clone())
        .send(&app)
        .await
        .assert_error(StatusCode::FORBIDDEN, "Forbidden");

    let admin = app.admin_token().await;
    let _ = TestRequest::post("/api/categories")
        .bearer(&admin)
        .json(body)
        .send(&app)
        .await
        .assert_status(StatusCode::CREATED);
}

#[test(tokio::test)]
async fn role_management_is_admin_only() {
    let app = TestApp::new().await;

    let _ = TestRequest::get("/api/roles")
        .send(&app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let token = app.user_token("alice").await;
    let _ = TestRequest::get("/api/roles")
        .bearer(&token)
        .send(&app)
        .await
        .assert_error(StatusCode::FORBIDDEN, "Forbidden");

    let admin = app.admin_token().await;
    let _ = TestRequest::get("/api/roles")
        .bearer(&admin)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
}

#[test(tokio::test)]
async fn deleted_account_token_stops_working() {
    let app = TestApp::new().await;
    let token = app.user_token("alice").await;

    let _ = TestRequest::delete("/api/users/me")
        .bearer(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let _ = TestRequest::get("/api/users/me")
        .bearer(&token)
        .send(&app)
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "Unauthorized");
}

#[test(tokio::test)]
async fn granted_role_applies_to_existing_tokens() {
    let app = TestApp::new().await;
    let token = app.user_token("alice").await;
    let admin = app.admin_token().await;

    let _ = TestRequest::get("/api/roles")
        .bearer(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let _ = TestRequest::post("/api/roles/assign")
        .bearer(&admin)
        .json(json!({ "username": "alice", "role": "ROLE_ADMIN" }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK);

    // Roles are loaded per request, not baked into the token.
    let _ = TestRequest::get("/api/roles")
        .bearer(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
}

#[test(tokio::test)]
async fn encoded_admin_paths_are_still_protected() {
    let app = TestApp::new().await;
    let token = app.user_token("alice").await;

    let _ = TestRequest::post("/api/%72oles/assign")
        .bearer(&token)
        .json(json!({ "username": "alice", "role": "ROLE_ADMIN" }))
        .send(&app)
        .await
        .assert_error(StatusCode::FORBIDDEN, "Forbidden");

    let _ = TestRequest::post("/api/%63ategories")
        .bearer(&token)
        .json(json!({ "name": "Smuggled", "description": null }))
        .send(&app)
        .await
        .assert_error(StatusCode::FORBIDDEN, "Forbidden");

    let me = TestRequest::get("/api/users/me")
        .bearer(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(me["role_names"], json!(["ROLE_USER"]));

    // The same encoded path still routes for an administrator.
    let admin = app.admin_token().await;
    let _ = TestRequest::post("/api/%63ategories")
        .bearer(&admin)
        .json(json!({ "name": "Books", "description": null }))
        .send(&app)
        .await
        .assert_status(StatusCode::CREATED);
}
