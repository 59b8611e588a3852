//! Feature modules implementing the ACME API
//!
//! Each feature is a vertical slice with its own commands, queries and
//! routes. Handlers receive repositories as trait objects taken from
//! [`FeatureState`], so the same routes run against PostgreSQL in
//! production and against in-memory stores in tests.
//!
//! # Features
//!
//! - **authentication**: email/password login issuing bearer tokens
//! - **books**: bearer-protected CRUD and paged search
//! - **management**: migrations, migration check and admin seeding
//! - **users**: account creation and lookup (no routes)
//!
//! # Architecture
//!
//! - `commands/` - Write operations
//! - `queries/` - Read operations
//! - `routes.rs` - HTTP route definitions
//! - `types.rs` - Wire shapes (if needed)

pub mod authentication;
pub mod books;
pub mod management;
pub mod shared;
pub mod users;

use std::sync::Arc;

use axum::{extract::FromRef, Router};

use crate::auth::TokenService;
use crate::config::SeedConfig;
use crate::db::{BooksRepository, DatabaseManagement, UsersRepository};

/// Shared state for all feature routes
///
/// Handlers pull out only the parts they need through `State<T>`.
#[derive(Clone, FromRef)]
pub struct FeatureState {
    pub books: Arc<dyn BooksRepository>,
    pub users: Arc<dyn UsersRepository>,
    pub management: Arc<dyn DatabaseManagement>,
    pub tokens: Arc<TokenService>,
    /// Administrator created after migrating
    pub seed: SeedConfig,
}

/// Creates the API router with every feature mounted under its prefix:
///
/// - `/authentication` - Login
/// - `/books` - Book catalogue
/// - `/application-management` - Schema management
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/authentication", authentication::authentication_routes())
        .nest("/books", books::books_routes())
        .nest("/application-management", management::management_routes())
        .with_state(state)
}
