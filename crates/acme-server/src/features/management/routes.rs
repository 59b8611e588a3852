//! Application management API routes
//!
//! Both endpoints are anonymous and answer `true` on success and `false`
//! on failure; the failure reason is only logged.
//!
//! - `GET /api/v1/application-management/assert-migrations`
//! - `GET /api/v1/application-management/migrate?targetMigration=`

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use super::commands::MigrateCommand;
use crate::config::SeedConfig;
use crate::db::{DatabaseManagement, UsersRepository};
use crate::features::FeatureState;

pub fn management_routes() -> Router<FeatureState> {
    Router::new()
        .route("/assert-migrations", get(assert_migrations))
        .route("/migrate", get(migrate))
}

/// Whether every embedded migration has been applied
#[utoipa::path(
    get,
    path = "/api/v1/application-management/assert-migrations",
    tag = "application-management",
    responses((status = 200, description = "true when no migration is pending", body = bool))
)]
#[tracing::instrument(skip_all)]
pub async fn assert_migrations(State(management): State<Arc<dyn DatabaseManagement>>) -> Json<bool> {
    match super::queries::assert_migrations::handle(management.as_ref()).await {
        Ok(()) => Json(true),
        Err(e) => {
            tracing::warn!(key = %e.key(), "{}", e.message());
            Json(false)
        },
    }
}

/// Migrate the schema and seed the administrator
#[utoipa::path(
    get,
    path = "/api/v1/application-management/migrate",
    tag = "application-management",
    params(MigrateCommand),
    responses((status = 200, description = "true when the schema reached the target", body = bool))
)]
#[tracing::instrument(skip_all, fields(target = ?command.target_migration))]
pub async fn migrate(
    State(management): State<Arc<dyn DatabaseManagement>>,
    State(users): State<Arc<dyn UsersRepository>>,
    State(seed): State<SeedConfig>,
    Query(command): Query<MigrateCommand>,
) -> Json<bool> {
    match super::commands::migrate::handle(management.as_ref(), users.as_ref(), &seed, command).await {
        Ok(target) => {
            tracing::info!("Database successfully migrated to {}", target);
            Json(true)
        },
        Err(e) => {
            tracing::warn!(key = %e.key(), "Database migration failed: {}", e.message());
            Json(false)
        },
    }
}
