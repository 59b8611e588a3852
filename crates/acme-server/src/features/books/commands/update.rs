//! Update book command

use acme_common::{AcmeError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::create::MAX_TEXT_LENGTH;
use crate::db::BooksRepository;
use crate::features::shared::validation::{validate_price, validate_text, FieldErrors};
use crate::models::BookUpdate;

/// Replaces every field of an existing book
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookCommand {
    /// Must match the identifier in the route
    pub id: String,

    pub name: String,

    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 24.5)]
    pub price: Decimal,

    pub category: String,

    pub author: String,
}

impl UpdateBookCommand {
    /// Rejects a body whose identifier differs from the route's
    pub fn ensure_route_id(&self, route_id: &str) -> Result<()> {
        if self.id != route_id {
            return Err(AcmeError::validation(format!(
                "Route identifier {route_id} does not match the book identifier {}.",
                self.id
            ))
            .with_code("book#identifierMismatch"));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(book_id = %self.id))]
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        errors
            .check("id", validate_text(&self.id, MAX_TEXT_LENGTH))
            .check("name", validate_text(&self.name, MAX_TEXT_LENGTH))
            .check("price", validate_price(self.price))
            .check("category", validate_text(&self.category, MAX_TEXT_LENGTH))
            .check("author", validate_text(&self.author, MAX_TEXT_LENGTH));
        errors.into_result("The book is not valid.")
    }
}

impl From<UpdateBookCommand> for BookUpdate {
    fn from(command: UpdateBookCommand) -> Self {
        BookUpdate {
            id: command.id,
            name: command.name,
            price: command.price,
            category: command.category,
            author: command.author,
        }
    }
}

/// Not-found from the repository when the book does not exist
#[tracing::instrument(skip(books, command), fields(book_id = %command.id))]
pub async fn handle(books: &dyn BooksRepository, command: UpdateBookCommand) -> Result<()> {
    command.validate()?;

    books.update(command.into()).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryBooksRepository;
    use crate::models::Book;
    use acme_common::ErrorKind;

    fn stored() -> Book {
        Book {
            id: "b-1".to_string(),
            name: "Dune".to_string(),
            price: Decimal::from(10),
            category: "Sci-fi".to_string(),
            author: "Frank Herbert".to_string(),
        }
    }

    fn command(id: &str) -> UpdateBookCommand {
        UpdateBookCommand {
            id: id.to_string(),
            name: "Dune Messiah".to_string(),
            price: Decimal::new(1250, 2),
            category: "Sci-fi".to_string(),
            author: "Frank Herbert".to_string(),
        }
    }

    #[test]
    fn test_route_id_mismatch() {
        let err = command("b-1").ensure_route_id("b-2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.key(), "Acme.Validation-book#identifierMismatch");

        assert!(command("b-1").ensure_route_id("b-1").is_ok());
    }

    #[tokio::test]
    async fn test_handle_replaces_fields() {
        let repo = InMemoryBooksRepository::with_books([stored()]);

        handle(&repo, command("b-1")).await.unwrap();

        let book = repo.find_by_id("b-1").await.unwrap().unwrap();
        assert_eq!(book.name, "Dune Messiah");
        assert_eq!(book.price, Decimal::new(1250, 2));
    }

    #[tokio::test]
    async fn test_handle_missing_book_changes_nothing() {
        let repo = InMemoryBooksRepository::with_books([stored()]);

        let err = handle(&repo, command("missing")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EntityNotFound);
        assert_eq!(repo.find_by_id("b-1").await.unwrap().unwrap(), stored());
        assert_eq!(repo.book_count().await, 1);
    }
}
