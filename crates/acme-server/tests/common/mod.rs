//! Shared helpers for router-level tests
//!
//! Builds the full application router on top of the in-memory repositories
//! so requests go through the same middleware, extractors and error
//! rendering as in production.

#![allow(dead_code)]

use std::sync::Arc;

use acme_server::{
    api,
    auth::TokenService,
    config::{Config, Environment, SeedConfig, TokenConfig},
    db::memory::{InMemoryBooksRepository, InMemoryDatabaseManagement, InMemoryUsersRepository},
    features::FeatureState,
    models::ApplicationUser,
};
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt; // for `oneshot`

pub const TEST_JWT_SECRET: &str = "router-tests-secret-that-is-at-least-32-bytes";

pub struct TestApp {
    pub router: Router,
    pub books: Arc<InMemoryBooksRepository>,
    pub users: Arc<InMemoryUsersRepository>,
    pub management: Arc<InMemoryDatabaseManagement>,
    pub tokens: Arc<TokenService>,
}

/// A router response with its body parsed as JSON (`Null` when empty)
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub fn test_config(environment: Environment) -> Config {
    let mut config = Config::default();
    config.server.environment = environment;
    config.token = TokenConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        jwt_expiration_secs: 3600,
    };
    config
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(InMemoryDatabaseManagement::up_to_date(), Environment::Development)
    }

    pub fn with(management: InMemoryDatabaseManagement, environment: Environment) -> Self {
        let config = test_config(environment);

        let books = Arc::new(InMemoryBooksRepository::new());
        let users = Arc::new(InMemoryUsersRepository::new());
        let management = Arc::new(management);
        let tokens = Arc::new(TokenService::new(&config.token));

        let state = FeatureState {
            books: books.clone(),
            users: users.clone(),
            management: management.clone(),
            tokens: tokens.clone(),
            seed: SeedConfig::default(),
        };

        Self {
            router: api::create_router(state, &config),
            books,
            users,
            management,
            tokens,
        }
    }

    /// Bearer token for a user that does not need to exist
    pub fn token(&self) -> String {
        let user = ApplicationUser {
            id: "test-user".to_string(),
            username: "tester".to_string(),
            email: "tester@acme.com".to_string(),
        };
        self.tokens.issue(&user).unwrap().access_token
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse { status, headers, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn json(&self, method: Method, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(request(method, uri, token, Some(body))).await
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
