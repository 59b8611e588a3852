//! Administrator seeding

use acme_common::Result;

use crate::config::SeedConfig;
use crate::db::UsersRepository;
use crate::features::users::{commands, CreateUserCommand};

/// Creates the administrator account unless one with the same email exists.
/// Returns whether an account was created.
#[tracing::instrument(skip(users, seed), fields(email = %seed.admin_email))]
pub async fn seed_admin_user(users: &dyn UsersRepository, seed: &SeedConfig) -> Result<bool> {
    if users.find_by_email(&seed.admin_email).await?.is_some() {
        tracing::debug!("Administrator already present");
        return Ok(false);
    }

    let admin = commands::create::handle(
        users,
        CreateUserCommand {
            email: seed.admin_email.clone(),
            username: seed.admin_username.clone(),
            password: seed.admin_password.clone(),
        },
    )
    .await?;

    tracing::info!(user_id = %admin.id, username = %admin.username, "Seeded administrator account");
    Ok(true)
}
