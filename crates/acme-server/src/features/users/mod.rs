//! Application users feature
//!
//! No HTTP routes: accounts are created by the admin seeding step and read
//! back by identifier.

pub mod commands;
pub mod queries;

pub use commands::CreateUserCommand;
pub use queries::GetUserQuery;
