//! Application management feature
//!
//! Schema migrations, the pending-migration check and administrator
//! seeding.

pub mod commands;
pub mod queries;
pub mod routes;
pub mod seed;

pub use commands::MigrateCommand;
pub use routes::management_routes;
pub use seed::seed_admin_user;
