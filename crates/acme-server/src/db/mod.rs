//! Persistence layer
//!
//! Feature handlers talk to storage only through the traits defined here.
//! PostgreSQL implementations live in [`books`], [`users`] and
//! [`management`]; [`memory`] holds in-process implementations used by tests
//! and local tooling.
//!
//! Repositories never return raw `sqlx` errors: failures are wrapped into a
//! generic [`AcmeError`](acme_common::AcmeError) with context, and
//! not-found conditions are raised before any mutation.

pub mod books;
pub mod management;
pub mod memory;
pub mod users;

use acme_common::Result;
use async_trait::async_trait;
use sqlx::{
    migrate::Migrator,
    postgres::{PgPool, PgPoolOptions},
};
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::features::shared::pagination::PagedRequest;
use crate::models::{ApplicationUser, ApplicationUserCreate, Book, BookCreate, BookUpdate};

pub use books::{BookSortColumn, PgBooksRepository};
pub use management::{MigrationTarget, PgDatabaseManagement};
pub use users::PgUsersRepository;

/// Migrations embedded from the workspace `migrations/` directory
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Book storage
#[async_trait]
pub trait BooksRepository: Send + Sync {
    /// One page ordered by the request's sort column, id as tie-breaker.
    /// Fails with an out-of-range validation error before querying when the
    /// paging values are invalid.
    async fn find_page(&self, request: &PagedRequest) -> Result<Vec<Book>>;

    async fn count(&self) -> Result<i64>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>>;

    /// Assigns a new identifier and returns the stored book
    async fn create(&self, book: BookCreate) -> Result<Book>;

    /// Not-found when no book has `book.id`
    async fn update(&self, book: BookUpdate) -> Result<Book>;

    /// Not-found when no book has `id`
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Application account storage
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// `None` both for an unknown email and for a wrong password
    async fn find_by_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<ApplicationUser>>;

    /// Case-insensitive email lookup
    async fn find_by_email(&self, email: &str) -> Result<Option<ApplicationUser>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<ApplicationUser>>;

    /// Applies the password policy and uniqueness rules, stores the account
    /// and returns its identifier
    async fn create(&self, user: ApplicationUserCreate) -> Result<String>;
}

/// Schema management and connectivity
#[async_trait]
pub trait DatabaseManagement: Send + Sync {
    /// Generic error listing every pending migration, if any
    async fn assert_migrations(&self) -> Result<()>;

    /// Moves the schema to `target`, returning the name of the migration now
    /// at the head (`None` when everything was reverted)
    async fn migrate(&self, target: &MigrationTarget) -> Result<Option<String>>;

    /// Round trip to the database
    async fn ping(&self) -> Result<()>;
}

pub async fn create_pool(config: &DatabaseConfig) -> std::result::Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database connection pool created"
    );

    Ok(pool)
}

pub async fn health_check(pool: &PgPool) -> std::result::Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}

/// `true` when the error is a unique constraint violation
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
