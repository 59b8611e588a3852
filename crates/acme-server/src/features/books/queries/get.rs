//! Get book query

use acme_common::{AcmeError, Result};

use crate::db::BooksRepository;
use crate::features::books::types::BookDto;

#[derive(Debug, Clone)]
pub struct GetBookQuery {
    pub id: String,
}

/// Absent books are reported as not-found
#[tracing::instrument(skip(books))]
pub async fn handle(books: &dyn BooksRepository, query: GetBookQuery) -> Result<BookDto> {
    books
        .find_by_id(&query.id)
        .await?
        .map(BookDto::from)
        .ok_or_else(|| AcmeError::not_found(format!("No book was found for identifier {}.", query.id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryBooksRepository;
    use crate::models::Book;
    use acme_common::ErrorKind;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_get_existing() {
        let repo = InMemoryBooksRepository::with_books([Book {
            id: "b-1".to_string(),
            name: "Dune".to_string(),
            price: Decimal::from(10),
            category: "Sci-fi".to_string(),
            author: "Frank Herbert".to_string(),
        }]);

        let book = handle(&repo, GetBookQuery { id: "b-1".to_string() }).await.unwrap();
        assert_eq!(book.name, "Dune");
    }

    #[tokio::test]
    async fn test_get_missing() {
        let repo = InMemoryBooksRepository::new();

        let err = handle(&repo, GetBookQuery { id: "b-9".to_string() })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EntityNotFound);
        assert_eq!(err.message(), "No book was found for identifier b-9.");
    }
}
