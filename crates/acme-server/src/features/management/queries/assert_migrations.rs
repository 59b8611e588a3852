//! Assert migrations query

use acme_common::Result;

use crate::db::DatabaseManagement;

/// Generic error naming every pending migration
#[tracing::instrument(skip(management))]
pub async fn handle(management: &dyn DatabaseManagement) -> Result<()> {
    management.assert_migrations().await
}
