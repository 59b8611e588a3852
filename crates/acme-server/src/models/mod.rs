//! Domain models
//!
//! These types flow between the repositories and the feature handlers. Wire
//! shapes live next to the routes that expose them and convert from these.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Book model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub author: String,
}

/// Data needed to insert a book; the identifier is assigned on insert
#[derive(Debug, Clone, PartialEq)]
pub struct BookCreate {
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub author: String,
}

/// Full replacement of an existing book's fields
#[derive(Debug, Clone, PartialEq)]
pub struct BookUpdate {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub author: String,
}

impl BookCreate {
    pub(crate) fn into_book(self, id: String) -> Book {
        Book {
            id,
            name: self.name,
            price: self.price,
            category: self.category,
            author: self.author,
        }
    }
}

impl From<BookUpdate> for Book {
    fn from(update: BookUpdate) -> Self {
        Book {
            id: update.id,
            name: update.name,
            price: update.price,
            category: update.category,
            author: update.author,
        }
    }
}

/// Application user model. The password hash never leaves the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ApplicationUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// Data needed to register an account
#[derive(Clone)]
pub struct ApplicationUserCreate {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for ApplicationUserCreate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationUserCreate")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Signed bearer token with its validity window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

/// Outcome of a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResponse {
    pub user_id: String,
    pub username: String,
    pub token: Token,
}

/// Case-insensitive form used for uniqueness and lookups
pub fn normalize_identity(value: &str) -> String {
    value.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_create_debug_hides_password() {
        let create = ApplicationUserCreate {
            email: "admin@acme.com".to_string(),
            username: "admin".to_string(),
            password: "pa$$w0rd".to_string(),
        };

        let rendered = format!("{create:?}");
        assert!(rendered.contains("admin@acme.com"));
        assert!(!rendered.contains("pa$$w0rd"));
    }

    #[test]
    fn test_normalize_identity() {
        assert_eq!(normalize_identity(" Admin@Acme.com "), "ADMIN@ACME.COM");
    }
}
