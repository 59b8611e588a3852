//! Create application user command
//!
//! Stores the account through the repository and reads it back by the
//! returned identifier, so callers always get the persisted record.

use acme_common::{AcmeError, Result};

use crate::db::UsersRepository;
use crate::features::users::queries::{self, GetUserQuery};
use crate::models::{ApplicationUser, ApplicationUserCreate};

#[derive(Clone)]
pub struct CreateUserCommand {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CreateUserCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserCommand")
            .field("email", &self.email)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl From<CreateUserCommand> for ApplicationUserCreate {
    fn from(command: CreateUserCommand) -> Self {
        ApplicationUserCreate {
            email: command.email,
            username: command.username,
            password: command.password,
        }
    }
}

/// Policy and uniqueness failures surface as the repository's generic
/// creation error
#[tracing::instrument(skip(users, command), fields(email = %command.email, username = %command.username))]
pub async fn handle(users: &dyn UsersRepository, command: CreateUserCommand) -> Result<ApplicationUser> {
    let id = users.create(command.into()).await?;

    let created = queries::get::handle(users, GetUserQuery { id: id.clone() }).await?;

    created.ok_or_else(|| {
        AcmeError::generic(format!(
            "Could not find application user with the newly created identifier. {id}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryUsersRepository;
    use acme_common::ErrorKind;

    fn command(email: &str, username: &str, password: &str) -> CreateUserCommand {
        CreateUserCommand {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_fetch_returns_same_record() {
        let repo = InMemoryUsersRepository::new();

        let created = handle(&repo, command("jane@acme.com", "jane", "s3cret!"))
            .await
            .unwrap();

        assert_eq!(created.email, "jane@acme.com");
        assert_eq!(created.username, "jane");

        let fetched = queries::get::handle(&repo, GetUserQuery { id: created.id.clone() })
            .await
            .unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn test_policy_violation_is_generic_failure() {
        let repo = InMemoryUsersRepository::new();

        let err = handle(&repo, command("jane@acme.com", "jane", "short"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Generic);
        assert_eq!(err.message(), "Failed to create the application user.");
        assert_eq!(repo.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_email_differs_only_in_case() {
        let repo = InMemoryUsersRepository::new();
        handle(&repo, command("jane@acme.com", "jane", "s3cret!")).await.unwrap();

        let err = handle(&repo, command("JANE@ACME.COM", "jane2", "s3cret!"))
            .await
            .unwrap_err();

        assert_eq!(err.message(), "Failed to create the application user.");
        assert_eq!(repo.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_missing_after_create_is_generic_error() {
        let repo = InMemoryUsersRepository::forgetful();

        let err = handle(&repo, command("jane@acme.com", "jane", "s3cret!"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Generic);
        assert!(err
            .message()
            .starts_with("Could not find application user with the newly created identifier. "));
    }
}
