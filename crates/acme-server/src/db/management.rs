//! Schema management on top of the embedded sqlx migrator
//!
//! A migration is named `<version>_<description>`, e.g.
//! `20240101000000_initial_schema`. Targets can be given by that full name,
//! by version alone or by description in any case and separator style
//! (`InitialSchema`, `initial-schema`).

use std::collections::HashSet;

use acme_common::{AcmeError, Result};
use async_trait::async_trait;
use sqlx::{
    migrate::{Migrate, Migration, Migrator},
    PgPool,
};

use super::{health_check, DatabaseManagement, MIGRATOR};

/// Where [`DatabaseManagement::migrate`] should leave the schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationTarget {
    /// Apply every pending migration
    Latest,
    /// Revert every applied migration
    RevertAll,
    /// Apply or revert until the named migration is the newest applied one
    Named(String),
}

impl MigrationTarget {
    /// Blank means latest, `0` means revert everything
    pub fn parse(target: Option<&str>) -> Self {
        match target.map(str::trim) {
            None | Some("") => MigrationTarget::Latest,
            Some("0") => MigrationTarget::RevertAll,
            Some(name) => MigrationTarget::Named(name.to_string()),
        }
    }
}

impl std::fmt::Display for MigrationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationTarget::Latest => f.write_str("Latest"),
            MigrationTarget::RevertAll => f.write_str("0"),
            MigrationTarget::Named(name) => f.write_str(name),
        }
    }
}

/// `<version>_<description>` with spaces turned back into underscores
pub fn migration_name(migration: &Migration) -> String {
    format!("{}_{}", migration.version, migration.description.replace(' ', "_"))
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn up_migrations(migrator: &Migrator) -> impl Iterator<Item = &Migration> {
    migrator
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
}

/// Finds the up migration `name` refers to
pub fn resolve_target<'m>(migrator: &'m Migrator, name: &str) -> Result<&'m Migration> {
    let wanted = name.trim();
    let normalized = normalize(wanted);

    up_migrations(migrator)
        .find(|m| {
            m.version.to_string() == wanted
                || migration_name(m) == wanted
                || normalize(&m.description) == normalized
        })
        .ok_or_else(|| AcmeError::generic(format!("{wanted} is not a valid migration name!")))
}

/// Up migrations whose version is not in `applied`, oldest first
pub fn pending_migrations<'m>(migrator: &'m Migrator, applied: &HashSet<i64>) -> Vec<&'m Migration> {
    up_migrations(migrator)
        .filter(|m| !applied.contains(&m.version))
        .collect()
}

fn wrap(context: &str) -> impl Fn(sqlx::migrate::MigrateError) -> AcmeError + '_ {
    move |e| AcmeError::generic_with_source(context.to_string(), e)
}

#[derive(Debug, Clone)]
pub struct PgDatabaseManagement {
    pool: PgPool,
    migrator: &'static Migrator,
}

impl PgDatabaseManagement {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            migrator: &MIGRATOR,
        }
    }

    async fn applied_versions(&self) -> Result<HashSet<i64>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AcmeError::generic_with_source("Failed to connect to the database.", e))?;

        conn.ensure_migrations_table()
            .await
            .map_err(wrap("Failed to prepare the migrations table."))?;

        let applied = conn
            .list_applied_migrations()
            .await
            .map_err(wrap("Failed to list applied migrations."))?;

        Ok(applied.into_iter().map(|m| m.version).collect())
    }

    /// Reverts anything newer than `target`, then applies what is missing up to it
    async fn migrate_to(&self, target: &Migration) -> Result<()> {
        self.migrator
            .undo(&self.pool, target.version)
            .await
            .map_err(wrap("Failed to revert migrations."))?;

        let applied = self.applied_versions().await?;
        let missing: Vec<_> = pending_migrations(self.migrator, &applied)
            .into_iter()
            .filter(|m| m.version <= target.version)
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AcmeError::generic_with_source("Failed to connect to the database.", e))?;

        conn.lock().await.map_err(wrap("Failed to lock the database for migration."))?;
        for migration in missing {
            tracing::info!(migration = %migration_name(migration), "Applying migration");
            if let Err(e) = conn.apply(migration).await {
                conn.unlock().await.ok();
                return Err(AcmeError::generic_with_source(
                    format!("Failed to apply migration {}", migration_name(migration)),
                    e,
                ));
            }
        }
        conn.unlock().await.map_err(wrap("Failed to unlock the database."))?;

        Ok(())
    }
}

#[async_trait]
impl DatabaseManagement for PgDatabaseManagement {
    #[tracing::instrument(skip(self))]
    async fn assert_migrations(&self) -> Result<()> {
        let applied = self.applied_versions().await?;
        let pending = pending_migrations(self.migrator, &applied);

        if pending.is_empty() {
            return Ok(());
        }

        let names: Vec<_> = pending.into_iter().map(migration_name).collect();
        Err(AcmeError::generic(format!(
            "Following migrations are waiting to be applied: {}",
            names.join(", ")
        )))
    }

    #[tracing::instrument(skip(self), fields(target = %target))]
    async fn migrate(&self, target: &MigrationTarget) -> Result<Option<String>> {
        match target {
            MigrationTarget::Latest => {
                self.migrator
                    .run(&self.pool)
                    .await
                    .map_err(wrap("Failed to apply pending migrations."))?;
                Ok(up_migrations(self.migrator).last().map(migration_name))
            },
            MigrationTarget::RevertAll => {
                self.migrator
                    .undo(&self.pool, 0)
                    .await
                    .map_err(wrap("Failed to revert migrations."))?;
                Ok(None)
            },
            MigrationTarget::Named(name) => {
                let migration = resolve_target(self.migrator, name)?;
                self.migrate_to(migration).await?;
                Ok(Some(migration_name(migration)))
            },
        }
    }

    async fn ping(&self) -> Result<()> {
        health_check(&self.pool)
            .await
            .map_err(|e| AcmeError::generic_with_source("Database is unreachable.", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        assert_eq!(MigrationTarget::parse(None), MigrationTarget::Latest);
        assert_eq!(MigrationTarget::parse(Some("  ")), MigrationTarget::Latest);
        assert_eq!(MigrationTarget::parse(Some("0")), MigrationTarget::RevertAll);
        assert_eq!(
            MigrationTarget::parse(Some("InitialSchema")),
            MigrationTarget::Named("InitialSchema".to_string())
        );
    }

    #[test]
    fn test_migration_name() {
        let first = up_migrations(&MIGRATOR).next().unwrap();
        assert_eq!(migration_name(first), "20240101000000_initial_schema");
    }

    #[test]
    fn test_resolve_target_by_any_spelling() {
        for name in [
            "20240101000000_initial_schema",
            "20240101000000",
            "InitialSchema",
            "initial-schema",
            "initial schema",
        ] {
            assert_eq!(resolve_target(&MIGRATOR, name).unwrap().version, 20240101000000);
        }

        assert_eq!(
            resolve_target(&MIGRATOR, "BookSortIndexes").unwrap().version,
            20240115000000
        );
    }

    #[test]
    fn test_resolve_unknown_target() {
        let err = resolve_target(&MIGRATOR, "AddUnicorns").unwrap_err();
        assert_eq!(err.message(), "AddUnicorns is not a valid migration name!");
        assert_eq!(err.key(), "Acme");
    }

    #[test]
    fn test_pending_migrations() {
        let none_applied = HashSet::new();
        assert_eq!(pending_migrations(&MIGRATOR, &none_applied).len(), 2);

        let first_applied = HashSet::from([20240101000000]);
        let pending = pending_migrations(&MIGRATOR, &first_applied);
        assert_eq!(pending.len(), 1);
        assert_eq!(migration_name(pending[0]), "20240115000000_book_sort_indexes");
    }
}
