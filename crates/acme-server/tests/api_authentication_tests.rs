//! Integration tests for the authentication endpoint

use acme_server::{db::UsersRepository, models::ApplicationUserCreate};
use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::TestApp;

async fn app_with_admin() -> TestApp {
    let app = TestApp::new();
    app.users
        .create(ApplicationUserCreate {
            email: "admin@acme.com".to_string(),
            username: "admin".to_string(),
            password: "pa$$w0rd".to_string(),
        })
        .await
        .unwrap();
    app
}

#[tokio::test]
async fn test_login_returns_usable_token() {
    let app = app_with_admin().await;

    let response = app
        .json(
            Method::POST,
            "/api/v1/authentication",
            None,
            json!({ "email": "admin@acme.com", "password": "pa$$w0rd" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], "admin");
    assert!(response.body["userId"].is_string());
    assert!(response.body["token"]["createdDateTimeUtc"].is_string());
    assert!(response.body["token"]["expirationDateTimeUtc"].is_string());

    let token = response.body["token"]["accessToken"].as_str().unwrap();
    let books = app
        .json(Method::POST, "/api/v1/books/search", Some(token), json!({}))
        .await;
    assert_eq!(books.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_email_and_wrong_password_look_the_same() {
    let app = app_with_admin().await;

    let unknown = app
        .json(
            Method::POST,
            "/api/v1/authentication",
            None,
            json!({ "email": "ghost@acme.com", "password": "pa$$w0rd" }),
        )
        .await;
    let wrong = app
        .json(
            Method::POST,
            "/api/v1/authentication",
            None,
            json!({ "email": "admin@acme.com", "password": "nope123" }),
        )
        .await;

    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown.body, wrong.body);
    assert_eq!(
        unknown.body,
        json!({
            "error": "Acme.Validation-authentication#invalidEmailOrPassword",
            "message": "Username or password is not valid.",
            "statusCode": 400
        })
    );
}

#[tokio::test]
async fn test_blank_credentials_are_rejected() {
    let app = app_with_admin().await;

    let response = app
        .json(Method::POST, "/api/v1/authentication", None, json!({ "email": "admin@acme.com" }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["error"],
        "Acme.Validation-authentication#invalidEmailOrPassword"
    );
}
