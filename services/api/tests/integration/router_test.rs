//! Router-level checks that resolve before any query reaches the database.
//!
//! The state carries a disconnected `DatabaseConnection`, so a request that slipped past
//! authentication or validation would surface as a 500 instead of the expected status.

use axum::http::{HeaderValue, StatusCode, header::AUTHORIZATION};
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use uuid::Uuid;

use bookstore_api::infra::blob::LocalBlobStore;
use bookstore_api::infra::credentials::Argon2Credentials;
use bookstore_api::router::build_router;
use bookstore_api::state::AppState;
use bookstore_auth_types::identity::TokenSecret;
use bookstore_testing::auth::{MockAuth, TEST_JWT_SECRET};

fn server(media: &tempfile::TempDir) -> TestServer {
    let state = AppState {
        db: DatabaseConnection::default(),
        jwt_secret: TokenSecret::new(TEST_JWT_SECRET),
        cookie_domain: "localhost".into(),
        blobs: LocalBlobStore::new(media.path(), "/media"),
        credentials: Argon2Credentials,
    };
    TestServer::new(build_router(state)).unwrap()
}

fn book_body() -> Value {
    json!({
        "title": "Clean Code",
        "author": 1,
        "category": 1,
        "isbn": "9780132350884",
        "publication_date": "2008-08-01",
        "publisher": "Prentice Hall",
        "price": "350000"
    })
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn healthz_answers_with_request_id() {
    let media = tempfile::tempdir().unwrap();
    let res = server(&media).get("/healthz").await;

    res.assert_status(StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn readyz_reports_unreachable_database() {
    let media = tempfile::tempdir().unwrap();
    server(&media)
        .get("/readyz")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let media = tempfile::tempdir().unwrap();
    server(&media)
        .get("/api/v1/nope/")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// ── Authentication ───────────────────────────────────────────────────────────

#[tokio::test]
async fn anonymous_writes_require_login() {
    let media = tempfile::tempdir().unwrap();
    let server = server(&media);

    let create = server.post("/api/v1/books/").json(&book_body()).await;
    create.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(create.json::<Value>()["kind"], "AUTHENTICATION_REQUIRED");

    server
        .delete("/api/v1/categories/tieu-thuyet/")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .post("/api/v1/reviews/")
        .json(&json!({ "book": 1, "rating": 5 }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .patch("/api/v1/reviews/1/")
        .json(&json!({ "rating": 4 }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/api/v1/users/me/")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .post("/api/v1/users/change_password/")
        .json(&json!({
            "old_password": "correct-horse-42",
            "new_password": "brand-new-pass-7",
            "new_password_confirm": "brand-new-pass-7"
        }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_token_is_treated_as_anonymous() {
    let media = tempfile::tempdir().unwrap();
    let res = server(&media)
        .post("/api/v1/books/")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer not-a-jwt"))
        .json(&book_body())
        .await;

    res.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>()["kind"], "AUTHENTICATION_REQUIRED");
}

#[tokio::test]
async fn anonymous_review_list_is_empty() {
    let media = tempfile::tempdir().unwrap();
    let res = server(&media).get("/api/v1/reviews/").await;

    res.assert_status(StatusCode::OK);
    assert_eq!(res.json::<Value>(), json!([]));
}

// ── Permissions ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn customer_cannot_touch_another_account() {
    let media = tempfile::tempdir().unwrap();
    let server = server(&media);
    let (name, value) = MockAuth::customer().header();
    let other = Uuid::new_v4();

    let update = server
        .put(&format!("/api/v1/users/{other}/"))
        .add_header(name.clone(), value.clone())
        .json(&json!({ "bio": "hello" }))
        .await;
    update.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(update.json::<Value>()["kind"], "PERMISSION_DENIED");

    server
        .delete(&format!("/api/v1/users/{other}/"))
        .add_header(name, value)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

// ── Validation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let media = tempfile::tempdir().unwrap();
    let (name, value) = MockAuth::staff().header();

    let res = server(&media)
        .post("/api/v1/books/")
        .add_header(name, value)
        .json(&json!({ "title": "No isbn" }))
        .await;

    res.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>()["kind"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn invalid_isbn_is_rejected_before_lookup() {
    let media = tempfile::tempdir().unwrap();
    let (name, value) = MockAuth::staff().header();
    let mut body = book_body();
    body["isbn"] = json!("12345678");

    server(&media)
        .post("/api/v1/books/")
        .add_header(name, value)
        .json(&body)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bad_query_and_path_parameters_are_rejected() {
    let media = tempfile::tempdir().unwrap();
    let server = server(&media);

    server
        .get("/api/v1/books/")
        .add_query_param("ordering", "isbn")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get("/api/v1/search/")
        .add_query_param("language", "xx")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get("/api/v1/reviews/not-a-number/")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_search_parameters_pass_extraction() {
    let media = tempfile::tempdir().unwrap();
    let server = server(&media);

    for uri in [
        "/api/v1/search/?q=&min_price=&max_price=&language=&ordering=",
        "/api/v1/search/?q=Clean&language=",
        "/api/v1/books/?category=&status=&page=",
        "/api/v1/reviews/?book=&rating=",
    ] {
        let res = server.get(uri).await;
        assert_ne!(res.status_code(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

// ── Session ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn logout_clears_access_token_cookie() {
    let media = tempfile::tempdir().unwrap();
    let res = server(&media).post("/api/v1/auth/logout/").await;

    res.assert_status(StatusCode::OK);
    assert!(res.headers().contains_key("set-cookie"));
    assert_eq!(res.json::<Value>()["message"], "logout successful");
}
