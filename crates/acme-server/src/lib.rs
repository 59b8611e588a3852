//! ACME Server Library
//!
//! HTTP API for a book catalogue with JWT authentication and database
//! schema management.
//!
//! # Overview
//!
//! - **API Endpoints**: books CRUD and paged search, authentication,
//!   migrations and seeding, health probe
//! - **Database Management**: PostgreSQL through SQLx with embedded migrations
//! - **Configuration**: environment-based configuration (`.env` supported)
//! - **Middleware**: CORS, request tracing, compression, panic recovery
//!
//! # Architecture
//!
//! Features are vertical slices of commands (writes) and queries (reads).
//! Handlers depend on repository traits from [`db`], never on a pool
//! directly, and every failure crosses the HTTP boundary through
//! [`AppError`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use acme_server::{api, auth::TokenService, config::Config, db, features::FeatureState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     let state = FeatureState {
//!         books: Arc::new(db::PgBooksRepository::new(pool.clone())),
//!         users: Arc::new(db::PgUsersRepository::new(pool.clone())),
//!         management: Arc::new(db::PgDatabaseManagement::new(pool)),
//!         tokens: Arc::new(TokenService::new(&config.token)),
//!         seed: config.seed.clone(),
//!     };
//!     let app = api::create_router(state, &config);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod models;

pub use error::{AppError, ErrorResponse};
