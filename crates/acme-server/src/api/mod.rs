//! HTTP application assembly
//!
//! [`create_router`] mounts the feature routes under `/api/v1`, adds the
//! service endpoints (`/`, `/healthz` and, outside production, the OpenAPI
//! document) and wraps everything in the middleware stack.

pub mod docs;
pub mod health;

use axum::{response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use tower_http::{catch_panic::CatchPanicLayer, compression::CompressionLayer};

use crate::config::Config;
use crate::features::{self, FeatureState};
use crate::middleware;

/// Path of the OpenAPI document
pub const OPENAPI_PATH: &str = "/docs/v1/swagger.json";

/// Create the application router with all routes and middleware
pub fn create_router(state: FeatureState, config: &Config) -> Router {
    let mut router = Router::new()
        .route("/", get(root))
        .route("/healthz", get(health::healthz))
        .with_state(state.management.clone());

    if config.server.environment.is_production() {
        tracing::debug!("OpenAPI document disabled in production");
    } else {
        router = router.route(OPENAPI_PATH, get(docs::openapi_document));
    }

    router
        .nest("/api/v1", features::router(state))
        // Apply layers from innermost to outermost
        .layer(CatchPanicLayer::custom(middleware::handle_panic))
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "ACME Web API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}
