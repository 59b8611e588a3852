//! PostgreSQL application user repository
//!
//! Emails and usernames are unique case-insensitively through their
//! normalized columns. Argon2 work runs on the blocking pool.

use acme_common::{AcmeError, Result};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{is_unique_violation, UsersRepository};
use crate::auth::password::{self, PasswordError};
use crate::models::{normalize_identity, ApplicationUser, ApplicationUserCreate};

pub(crate) const CREATE_FAILED_MESSAGE: &str = "Failed to create the application user.";

#[derive(Debug, FromRow)]
struct CredentialsRecord {
    id: String,
    username: String,
    email: String,
    password_hash: String,
}

#[derive(Debug, Clone)]
pub struct PgUsersRepository {
    pool: PgPool,
}

impl PgUsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Runs an Argon2 operation off the async workers
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> std::result::Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AcmeError::generic_with_source("Password hashing task failed.", e))?
        .map_err(|e| AcmeError::generic_with_source("Password hashing failed.", e))
}

/// Logs why an account could not be created and returns the public error
pub(crate) fn creation_failed(codes: &[&str]) -> AcmeError {
    tracing::warn!(errors = ?codes, "Application user was not created");
    AcmeError::generic(CREATE_FAILED_MESSAGE)
}

#[async_trait]
impl UsersRepository for PgUsersRepository {
    #[tracing::instrument(skip(self, password))]
    async fn find_by_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<ApplicationUser>> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, username, email, password_hash FROM application_users \
             WHERE normalized_email = $1",
        )
        .bind(normalize_identity(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AcmeError::generic_with_source("Failed to look up the application user.", e))?;

        let Some(record) = record else {
            return Ok(None);
        };

        let candidate = password.to_string();
        let hash = record.password_hash;
        let matches = run_blocking(move || password::verify_password(&candidate, &hash)).await?;

        Ok(matches.then_some(ApplicationUser {
            id: record.id,
            username: record.username,
            email: record.email,
        }))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<ApplicationUser>> {
        sqlx::query_as::<_, ApplicationUser>(
            "SELECT id, username, email FROM application_users WHERE normalized_email = $1",
        )
        .bind(normalize_identity(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AcmeError::generic_with_source("Failed to look up the application user.", e))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ApplicationUser>> {
        sqlx::query_as::<_, ApplicationUser>(
            "SELECT id, username, email FROM application_users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AcmeError::generic_with_source("Failed to look up the application user.", e))
    }

    #[tracing::instrument(skip(self, user), fields(email = %user.email, username = %user.username))]
    async fn create(&self, user: ApplicationUserCreate) -> Result<String> {
        let violations = password::check_password_policy(&user.password);
        if !violations.is_empty() {
            let codes: Vec<_> = violations.iter().map(|v| v.code()).collect();
            return Err(creation_failed(&codes));
        }

        let normalized_email = normalize_identity(&user.email);
        let normalized_username = normalize_identity(&user.username);

        let (email_taken, username_taken) = sqlx::query_as::<_, (bool, bool)>(
            "SELECT \
               EXISTS (SELECT 1 FROM application_users WHERE normalized_email = $1), \
               EXISTS (SELECT 1 FROM application_users WHERE normalized_username = $2)",
        )
        .bind(&normalized_email)
        .bind(&normalized_username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AcmeError::generic_with_source(CREATE_FAILED_MESSAGE, e))?;

        if email_taken || username_taken {
            let mut codes = Vec::new();
            if email_taken {
                codes.push("DuplicateEmail");
            }
            if username_taken {
                codes.push("DuplicateUserName");
            }
            return Err(creation_failed(&codes));
        }

        let plain = user.password.clone();
        let password_hash = run_blocking(move || password::hash_password(&plain)).await?;
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO application_users \
               (id, username, normalized_username, email, normalized_email, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&id)
        .bind(&user.username)
        .bind(&normalized_username)
        .bind(&user.email)
        .bind(&normalized_email)
        .bind(&password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                creation_failed(&["DuplicateEmailOrUserName"])
            } else {
                AcmeError::generic_with_source(CREATE_FAILED_MESSAGE, e)
            }
        })?;

        tracing::info!(user_id = %id, "Application user created");
        Ok(id)
    }
}
