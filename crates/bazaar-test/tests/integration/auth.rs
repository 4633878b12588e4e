//! Registration, login and token handling over HTTP.

use salvo::http::StatusCode;
use serde_json::json;
use test_log::test;

use super::helpers::{TestApp, TestRequest};

#[test(tokio::test)]
async fn register_returns_a_usable_token() {
    let app = TestApp::new().await;

    let token = app
        .register("alice", "alice@example.com", "passw0rd")
        .await
        .assert_status(StatusCode::OK)
        .text();
    assert_eq!(token.split('.').count(), 3, "token should be a JWS: {token}");

    let me = TestRequest::get("/api/users/me")
        .bearer(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(me["username"], "alice");
    assert_eq!(me["role_names"], json!(["ROLE_USER"]));
}

#[test(tokio::test)]
async fn login_returns_a_token_for_the_same_subject() {
    let app = TestApp::new().await;
    let _ = app.user_token("bob").await;

    let token = app
        .login("bob", "passw0rd")
        .await
        .assert_status(StatusCode::OK)
        .text();

    let me = TestRequest::get("/api/users/me")
        .bearer(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(me["username"], "bob");
}

#[test(tokio::test)]
async fn duplicate_username_or_email_conflicts() {
    let app = TestApp::new().await;
    let _ = app.user_token("carol").await;

    let _ = app
        .register("carol", "other@example.com", "passw0rd")
        .await
        .assert_error(StatusCode::CONFLICT, "AlreadyExists");
    let _ = app
        .register("carol2", "carol@example.com", "passw0rd")
        .await
        .assert_error(StatusCode::CONFLICT, "AlreadyExists");
}

#[test(tokio::test)]
async fn registration_reports_every_invalid_field() {
    let app = TestApp::new().await;

    let body = app
        .register("x", "not-an-email", "short")
        .await
        .assert_error(StatusCode::BAD_REQUEST, "ValidationFailed")
        .json();

    let fields: Vec<&str> = body["fields"]
        .as_array()
        .expect("fields array")
        .iter()
        .filter_map(|f| f["field"].as_str())
        .collect();
    assert!(fields.contains(&"username"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

#[test(tokio::test)]
async fn malformed_body_is_a_bad_request() {
    let app = TestApp::new().await;

    let _ = TestRequest::post("/api/auth/register")
        .json(json!({ "username": "dave" }))
        .send(&app)
        .await
        .assert_error(StatusCode::BAD_REQUEST, "BadRequest");
}

#[test(tokio::test)]
async fn login_failures_are_indistinguishable() {
    let app = TestApp::new().await;
    let _ = app.user_token("erin").await;

    let wrong_password = app
        .login("erin", "wr0ngpass")
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "InvalidCredentials");
    let unknown_user = app
        .login("nobody", "passw0rd")
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "InvalidCredentials");

    assert_eq!(wrong_password.body, unknown_user.body);
}

#[test(tokio::test)]
async fn blank_login_fields_are_rejected() {
    let app = TestApp::new().await;

    let _ = app
        .login("", "")
        .await
        .assert_error(StatusCode::BAD_REQUEST, "ValidationFailed");
}

#[test(tokio::test)]
async fn garbage_token_is_treated_as_anonymous() {
    let app = TestApp::new().await;

    let _ = TestRequest::get("/api/users/me")
        .bearer("not.a.token")
        .send(&app)
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "Unauthorized");

    // Public routes stay reachable with a bad token.
    let _ = TestRequest::get("/api/healthcheck")
        .bearer("not.a.token")
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
}

#[test(tokio::test)]
async fn token_signed_with_another_key_is_rejected() {
    use bazaar_test::component::auth::TokenCodec;
    use bazaar_test::component::config::SigningSecret;

    let app = TestApp::new().await;
    let token = app.user_token("frank").await;
    let me = TestRequest::get("/api/users/me")
        .bearer(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    let subject = me["user_id"].as_str().expect("user id").to_string();

    let foreign = TokenCodec::new(
        &SigningSecret::new("another-secret-0123456789abcdefgh"),
        chrono::TimeDelta::hours(1),
    );
    let forged = foreign
        .issue(&subject, chrono::Utc::now(), chrono::TimeDelta::hours(1))
        .expect("token issues");

    let _ = TestRequest::get("/api/users/me")
        .bearer(&forged)
        .send(&app)
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "Unauthorized");
}

#[test(tokio::test)]
async fn expired_token_is_rejected() {
    use bazaar_test::component::auth::TokenCodec;
    use bazaar_test::component::config::SigningSecret;

    let app = TestApp::new().await;
    let token = app.user_token("grace").await;
    let me = TestRequest::get("/api/users/me")
        .bearer(&token)
        .send(&app)
        .await
        .json();
    let subject = me["user_id"].as_str().expect("user id").to_string();

    let codec = TokenCodec::new(
        &SigningSecret::new(super::helpers::SECRET),
        chrono::TimeDelta::hours(1),
    );
    let stale = codec
        .issue(
            &subject,
            chrono::Utc::now() - chrono::TimeDelta::hours(2),
            chrono::TimeDelta::hours(1),
        )
        .expect("token issues");

    let _ = TestRequest::get("/api/users/me")
        .bearer(&stale)
        .send(&app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test(tokio::test)]
async fn unauthorized_responses_advertise_bearer() {
    let app = TestApp::new().await;
    let url = "http://127.0.0.1:5800/api/users/me";

    let response = salvo::test::TestClient::get(url).send(&app.service).await;

    assert_eq!(response.status_code, Some(StatusCode::UNAUTHORIZED));
    assert_eq!(
        response
            .headers()
            .get("www-authenticate")
            .and_then(|v| v.to_str().ok()),
        Some("Bearer")
    );
}
