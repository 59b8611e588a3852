//! Authentication feature
//!
//! Verifies email and password and issues the bearer token used by the
//! protected routes.

pub mod commands;
pub mod routes;

pub use commands::{AuthenticationResponseDto, LoginRequestDto, TokenDto};
pub use routes::authentication_routes;
