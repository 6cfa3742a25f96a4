//! API integration tests
//!
//! Drive the router in-process against an in-memory backend.

mod support;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone()
        .oneshot(request)
        .await
        .expect("Failed to send request")
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Failed to parse response")
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("No Location header")
}

fn timestamp(value: &Value) -> DateTime<Utc> {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("Not an RFC 3339 timestamp")
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = support::app();

    let response = send(&app, get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_screens_redirect_without_session() {
    let (app, _) = support::app();

    for request in [
        get("/", None),
        get("/my-borrows", None),
        get("/", Some("not-a-jwt")),
        post("/logout", None),
    ] {
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }
}

#[tokio::test]
async fn test_sign_in_screen_redirects_signed_in_user() {
    let (app, store) = support::app();
    let token = store.token_for(store.add_account("reader@example.org", "secret"));

    let response = send(&app, get("/login", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = send(&app, get("/login", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login() {
    let (app, store) = support::app();
    let user_id = store.add_account("reader@example.org", "secret");

    let response = send(
        &app,
        post_json("/login", json!({ "email": "reader@example.org", "password": "secret" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["user"]["id"], user_id.to_string());
    let token = body["access_token"].as_str().expect("No token in response");

    // The issued token opens the catalog
    let response = send(&app, get("/", Some(token))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejections() {
    let (app, store) = support::app();
    store.add_account("reader@example.org", "secret");

    let response = send(
        &app,
        post_json("/login", json!({ "email": "reader@example.org", "password": "wrong" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        post_json("/login", json!({ "email": "not-an-email", "password": "secret" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Validation");
}

#[tokio::test]
async fn test_catalog_ordered_by_title_with_disabled_borrow() {
    let (app, store) = support::app();
    let token = store.token_for(store.add_account("reader@example.org", "secret"));
    store.add_book("Persuasion", "Jane Austen", 2);
    store.add_book("Dune", "Frank Herbert", 0);
    store.add_book("Emma", "Jane Austen", 1);

    let response = send(&app, get("/", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["loading"], false);
    let books = body["books"].as_array().unwrap();
    let titles: Vec<&str> = books.iter().map(|b| b["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Dune", "Emma", "Persuasion"]);

    assert_eq!(books[0]["available"], 0);
    assert_eq!(books[0]["can_borrow"], false);
    assert_eq!(books[1]["can_borrow"], true);
}

#[tokio::test]
async fn test_borrow_then_return() {
    let (app, store) = support::app();
    let token = store.token_for(store.add_account("reader@example.org", "secret"));
    let book_id = store.add_book("Emma", "Jane Austen", 1);

    // Borrowing takes the last copy and the refreshed catalog shows it
    let before = Utc::now();
    let response = send(&app, post(&format!("/books/{}/borrow", book_id), Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["books"][0]["available"], 0);
    assert_eq!(body["books"][0]["can_borrow"], false);
    assert_eq!(store.available(book_id), 0);

    let response = send(&app, get("/my-borrows", Some(&token))).await;
    let body = body_json(response).await;
    let rows = body["borrows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "Emma");
    assert_eq!(rows[0]["status"], "Borrowed");
    assert_eq!(rows[0]["can_return"], true);

    let due = timestamp(&rows[0]["due_date"]);
    assert!(due >= before + Duration::days(14));
    assert!(due <= Utc::now() + Duration::days(14));

    // Returning closes the borrow and puts the copy back
    let borrow_id = rows[0]["id"].as_str().unwrap().to_string();
    let response = send(
        &app,
        post(&format!("/my-borrows/{}/return", borrow_id), Some(&token)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let row = &body["borrows"][0];
    assert_eq!(row["status"], "Returned");
    assert_eq!(row["can_return"], false);
    assert!(row["return_date"].is_string());
    assert_eq!(store.available(book_id), 1);

    // A second return of the same borrow changes nothing
    send(
        &app,
        post(&format!("/my-borrows/{}/return", borrow_id), Some(&token)),
    )
    .await;
    assert_eq!(store.available(book_id), 1);
}

#[tokio::test]
async fn test_ledger_is_per_user_and_newest_first() {
    let (app, store) = support::app();
    let reader = store.token_for(store.add_account("reader@example.org", "secret"));
    let other = store.token_for(store.add_account("other@example.org", "secret"));
    let emma = store.add_book("Emma", "Jane Austen", 3);
    let dune = store.add_book("Dune", "Frank Herbert", 3);

    send(&app, post(&format!("/books/{}/borrow", emma), Some(&reader))).await;
    send(&app, post(&format!("/books/{}/borrow", dune), Some(&reader))).await;
    send(&app, post(&format!("/books/{}/borrow", emma), Some(&other))).await;

    let body = body_json(send(&app, get("/my-borrows", Some(&reader))).await).await;
    let titles: Vec<&str> = body["borrows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Dune", "Emma"]);

    let body = body_json(send(&app, get("/my-borrows", Some(&other))).await).await;
    assert_eq!(body["borrows"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_borrow_leaves_catalog_unchanged() {
    let (app, store) = support::app();
    let token = store.token_for(store.add_account("reader@example.org", "secret"));
    let book_id = store.add_book("Emma", "Jane Austen", 1);

    store.fail_next("create_borrow");
    let response = send(&app, post(&format!("/books/{}/borrow", book_id), Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);

    // The catalog renders as loaded before the attempt, with a retry notice
    let body = body_json(response).await;
    assert_eq!(body["books"][0]["available"], 1);
    assert_eq!(body["books"][0]["can_borrow"], true);
    assert_eq!(body["notice"]["retryable"], true);
    assert_eq!(store.available(book_id), 1);

    let body = body_json(send(&app, get("/my-borrows", Some(&token))).await).await;
    assert!(body["borrows"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unavailable_book_cannot_be_borrowed() {
    let (app, store) = support::app();
    let token = store.token_for(store.add_account("reader@example.org", "secret"));
    let book_id = store.add_book("Dune", "Frank Herbert", 0);

    let response = send(&app, post(&format!("/books/{}/borrow", book_id), Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["books"][0]["available"], 0);

    let body = body_json(send(&app, get("/my-borrows", Some(&token))).await).await;
    assert!(body["borrows"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_logout_redirects_to_sign_in() {
    let (app, store) = support::app();
    let token = store.token_for(store.add_account("reader@example.org", "secret"));

    let response = send(&app, post("/logout", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}
