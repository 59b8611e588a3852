//! Migrate command
//!
//! Moves the schema to the requested migration and then makes sure the
//! administrator account exists. Reverting everything skips seeding since
//! the users table is gone.

use acme_common::Result;
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::config::SeedConfig;
use crate::db::{DatabaseManagement, MigrationTarget, UsersRepository};
use crate::features::management::seed::seed_admin_user;

/// `?targetMigration=`; blank applies everything, `0` reverts everything
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MigrateCommand {
    /// Version number or description of the migration to end on
    pub target_migration: Option<String>,
}

impl MigrateCommand {
    pub fn target(&self) -> MigrationTarget {
        MigrationTarget::parse(self.target_migration.as_deref())
    }
}

/// Returns the target actually reached
#[tracing::instrument(skip(management, users, seed))]
pub async fn handle(
    management: &dyn DatabaseManagement,
    users: &dyn UsersRepository,
    seed: &SeedConfig,
    command: MigrateCommand,
) -> Result<MigrationTarget> {
    let target = command.target();

    let head = management.migrate(&target).await?;
    tracing::debug!(head = ?head, "Schema migrated");

    if target != MigrationTarget::RevertAll {
        seed_admin_user(users, seed).await?;
    }

    Ok(target)
}
