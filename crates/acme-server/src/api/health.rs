//! Health probe
//!
//! `GET /healthz` reports the web API itself and the database. The response
//! is 503 as soon as one entry is unhealthy.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::DatabaseManagement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// One checked dependency
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthEntry {
    pub name: String,
    pub status: HealthStatus,
    pub description: Option<String>,
    pub duration_in_ms: f64,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub total_duration_in_ms: f64,
    pub entries: Vec<HealthEntry>,
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Every dependency is healthy", body = HealthReport),
        (status = 503, description = "At least one dependency is unhealthy", body = HealthReport)
    )
)]
pub async fn healthz(
    State(management): State<Arc<dyn DatabaseManagement>>,
) -> (StatusCode, Json<HealthReport>) {
    let started = Instant::now();

    let web_api = HealthEntry {
        name: "WebAPI".to_string(),
        status: HealthStatus::Healthy,
        description: None,
        duration_in_ms: elapsed_ms(started),
        tags: vec!["live".to_string()],
    };

    let db_started = Instant::now();
    let (status, description) = match management.ping().await {
        Ok(()) => (HealthStatus::Healthy, None),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            (HealthStatus::Unhealthy, Some(e.message().to_string()))
        },
    };
    let database = HealthEntry {
        name: "PostgreSQL".to_string(),
        status,
        description,
        duration_in_ms: elapsed_ms(db_started),
        tags: vec!["ready".to_string(), "db".to_string()],
    };

    let entries = vec![web_api, database];
    let status = if entries.iter().all(|e| e.status == HealthStatus::Healthy) {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unhealthy
    };
    let code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        code,
        Json(HealthReport {
            status,
            total_duration_in_ms: elapsed_ms(started),
            entries,
        }),
    )
}
