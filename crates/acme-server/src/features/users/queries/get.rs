//! Get application user query

use acme_common::Result;

use crate::db::UsersRepository;
use crate::models::ApplicationUser;

#[derive(Debug, Clone)]
pub struct GetUserQuery {
    pub id: String,
}

#[tracing::instrument(skip(users))]
pub async fn handle(users: &dyn UsersRepository, query: GetUserQuery) -> Result<Option<ApplicationUser>> {
    users.find_by_id(&query.id).await
}
