//! Category and product management through the API.

use salvo::http::StatusCode;
use serde_json::{Value, json};
use test_log::test;

use super::helpers::{TestApp, TestRequest};

async fn create_category(app: &TestApp, admin: &str, name: &str) -> Value {
    TestRequest::post("/api/categories")
        .bearer(admin)
        .json(json!({ "name": name, "description": "Things to read" }))
        .send(app)
        .await
        .assert_status(StatusCode::CREATED)
        .json()
}

async fn create_product(app: &TestApp, admin: &str, category_id: &str, name: &str) -> Value {
    TestRequest::post("/api/products")
        .bearer(admin)
        .json(json!({
            "category_id": category_id,
            "name": name,
            "description": null,
            "price_cents": 1999,
            "stock": 5,
        }))
        .send(app)
        .await
        .assert_status(StatusCode::CREATED)
        .json()
}

#[test(tokio::test)]
async fn category_lifecycle() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let user = app.user_token("alice").await;

    let category = create_category(&app, &admin, "Science Fiction").await;
    assert_eq!(category["slug"], "science-fiction");
    let id = category["id"].as_str().expect("id").to_string();
    let path = format!("/api/categories/{id}");

    let fetched = TestRequest::get(&path)
        .bearer(&user)
        .send(&app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(fetched["name"], "Science Fiction");

    let renamed = TestRequest::put(&path)
        .bearer(&admin)
        .json(json!({ "name": "Fantasy", "description": null }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(renamed["slug"], "fantasy");

    // The list must not serve the pre-update entry from cache.
    let listed = TestRequest::get("/api/categories")
        .bearer(&user)
        .send(&app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(listed[0]["name"], "Fantasy");

    let _ = TestRequest::delete(&path)
        .bearer(&admin)
        .send(&app)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let _ = TestRequest::get(&path)
        .bearer(&user)
        .send(&app)
        .await
        .assert_error(StatusCode::NOT_FOUND, "NotFound");
}

#[test(tokio::test)]
async fn duplicate_category_name_conflicts() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let _ = create_category(&app, &admin, "Books").await;

    let _ = TestRequest::post("/api/categories")
        .bearer(&admin)
        .json(json!({ "name": "Books", "description": null }))
        .send(&app)
        .await
        .assert_error(StatusCode::CONFLICT, "AlreadyExists");
}

#[test(tokio::test)]
async fn category_with_products_cannot_be_deleted() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let category = create_category(&app, &admin, "Books").await;
    let category_id = category["id"].as_str().expect("id");
    let product = create_product(&app, &admin, category_id, "Dune").await;

    let _ = TestRequest::delete(&format!("/api/categories/{category_id}"))
        .bearer(&admin)
        .send(&app)
        .await
        .assert_error(StatusCode::CONFLICT, "Conflict");

    let product_id = product["id"].as_str().expect("id");
    let _ = TestRequest::delete(&format!("/api/products/{product_id}"))
        .bearer(&admin)
        .send(&app)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let _ = TestRequest::delete(&format!("/api/categories/{category_id}"))
        .bearer(&admin)
        .send(&app)
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[test(tokio::test)]
async fn products_filter_by_category() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let user = app.user_token("alice").await;
    let books = create_category(&app, &admin, "Books").await;
    let games = create_category(&app, &admin, "Games").await;
    let books_id = books["id"].as_str().expect("id");
    let games_id = games["id"].as_str().expect("id");
    let _ = create_product(&app, &admin, books_id, "Dune").await;
    let _ = create_product(&app, &admin, games_id, "Chess").await;

    let all = TestRequest::get("/api/products")
        .bearer(&user)
        .send(&app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(all.as_array().map(Vec::len), Some(2));

    let only_books = TestRequest::get(&format!("/api/products?category_id={books_id}"))
        .bearer(&user)
        .send(&app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(only_books.as_array().map(Vec::len), Some(1));
    assert_eq!(only_books[0]["name"], "Dune");

    let _ = TestRequest::get("/api/products?category_id=nope")
        .bearer(&user)
        .send(&app)
        .await
        .assert_error(StatusCode::BAD_REQUEST, "BadRequest");
}

#[test(tokio::test)]
async fn product_input_is_validated() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let books = create_category(&app, &admin, "Books").await;

    let body = TestRequest::post("/api/products")
        .bearer(&admin)
        .json(json!({
            "category_id": books["id"],
            "name": "",
            "description": null,
            "price_cents": -1,
            "stock": -3,
        }))
        .send(&app)
        .await
        .assert_error(StatusCode::BAD_REQUEST, "ValidationFailed")
        .json();
    assert_eq!(body["fields"].as_array().map(Vec::len), Some(3));

    let _ = TestRequest::post("/api/products")
        .bearer(&admin)
        .json(json!({
            "category_id": uuid::Uuid::now_v7(),
            "name": "Orphan",
            "description": null,
            "price_cents": 100,
            "stock": 1,
        }))
        .send(&app)
        .await
        .assert_error(StatusCode::NOT_FOUND, "NotFound");
}

#[test(tokio::test)]
async fn invalid_path_id_is_a_bad_request() {
    let app = TestApp::new().await;
    let user = app.user_token("alice").await;

    let _ = TestRequest::get("/api/products/not-a-uuid")
        .bearer(&user)
        .send(&app)
        .await
        .assert_error(StatusCode::BAD_REQUEST, "BadRequest");
}
