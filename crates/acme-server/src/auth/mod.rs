//! Authentication primitives
//!
//! - **password**: Argon2id hashing and the password policy
//! - **token**: HS512 access tokens
//! - [`AuthenticatedUser`]: extractor guarding bearer-protected routes
//!
//! Handlers opt in to authentication by taking an [`AuthenticatedUser`]
//! argument; a missing or invalid `Authorization: Bearer` header rejects the
//! request with a 401 before the handler runs.

pub mod password;
pub mod token;

use std::sync::Arc;

use acme_common::AcmeError;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

pub use token::{Claims, TokenService};

use crate::error::AppError;

/// Caller identity taken from a verified bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: String,
    pub username: String,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.nameid,
            username: claims.unique_name,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AcmeError::unauthorized("Authorization header is missing."))?;

        let token = bearer_token(header.to_str().unwrap_or_default()).ok_or_else(|| {
            AcmeError::unauthorized("Authorization header must use the Bearer scheme.")
        })?;

        let tokens = Arc::<TokenService>::from_ref(state);
        let claims = tokens.verify(token)?;

        Ok(claims.into())
    }
}

/// Extracts the credentials of a `Bearer` authorization value; the scheme is case-insensitive
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer   abc"), Some("abc"));
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc.def.ghi"), None);
    }
}
