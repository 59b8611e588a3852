//! Create book command

use acme_common::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::BooksRepository;
use crate::features::books::types::BookDto;
use crate::features::shared::validation::{validate_price, validate_text, FieldErrors};
use crate::models::BookCreate;

/// Longest accepted name, category or author
pub const MAX_TEXT_LENGTH: usize = 256;

/// Command to create a new book
///
/// # Examples
///
/// ```rust,ignore
/// use acme_server::features::books::commands::CreateBookCommand;
///
/// let command = CreateBookCommand {
///     name: "Book name".to_string(),
///     price: 20.into(),
///     category: "Book category".to_string(),
///     author: "Book author".to_string(),
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookCommand {
    #[schema(example = "Book name")]
    pub name: String,

    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 20.0)]
    pub price: Decimal,

    #[schema(example = "Book category")]
    pub category: String,

    #[schema(example = "Book author")]
    pub author: String,
}

impl CreateBookCommand {
    /// Name, category and author must be non-blank and at most
    /// [`MAX_TEXT_LENGTH`] characters; the price must be a non-negative
    /// amount with at most two decimals.
    #[tracing::instrument(skip(self), fields(name = %self.name))]
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        errors
            .check("name", validate_text(&self.name, MAX_TEXT_LENGTH))
            .check("price", validate_price(self.price))
            .check("category", validate_text(&self.category, MAX_TEXT_LENGTH))
            .check("author", validate_text(&self.author, MAX_TEXT_LENGTH));
        errors.into_result("The book is not valid.")
    }
}

impl From<CreateBookCommand> for BookCreate {
    fn from(command: CreateBookCommand) -> Self {
        BookCreate {
            name: command.name,
            price: command.price,
            category: command.category,
            author: command.author,
        }
    }
}

/// Validates, stores and returns the created book
#[tracing::instrument(skip(books, command), fields(name = %command.name))]
pub async fn handle(books: &dyn BooksRepository, command: CreateBookCommand) -> Result<BookDto> {
    command.validate()?;

    let created = books.create(command.into()).await?;

    Ok(created.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryBooksRepository;
    use acme_common::ErrorKind;

    fn command() -> CreateBookCommand {
        CreateBookCommand {
            name: "Book name".to_string(),
            price: Decimal::from(20),
            category: "Book category".to_string(),
            author: "Book author".to_string(),
        }
    }

    #[test]
    fn test_validation_success() {
        assert!(command().validate().is_ok());
    }

    #[test]
    fn test_validation_reports_every_bad_field() {
        let cmd = CreateBookCommand {
            name: "  ".to_string(),
            price: Decimal::from(-1),
            author: "a".repeat(MAX_TEXT_LENGTH + 1),
            ..command()
        };

        let err = cmd.validate().unwrap_err();
        let fields = err.field_errors().unwrap();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("author"));
        assert!(!fields.contains_key("category"));
    }

    #[tokio::test]
    async fn test_handle_assigns_id_and_keeps_fields() {
        let repo = InMemoryBooksRepository::new();

        let created = handle(&repo, command()).await.unwrap();

        assert!(!created.id.is_empty());
        assert_eq!(created.name, "Book name");
        assert_eq!(created.author, "Book author");
        assert_eq!(created.category, "Book category");
        assert_eq!(created.price, Decimal::from(20));
        assert_eq!(repo.book_count().await, 1);
    }

    #[tokio::test]
    async fn test_handle_rejects_invalid_without_storing() {
        let repo = InMemoryBooksRepository::new();
        let cmd = CreateBookCommand {
            name: String::new(),
            ..command()
        };

        assert!(handle(&repo, cmd).await.is_err());
        assert_eq!(repo.book_count().await, 0);
    }
}
