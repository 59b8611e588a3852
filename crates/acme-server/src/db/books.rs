//! PostgreSQL book repository

use std::cmp::Ordering;

use acme_common::{AcmeError, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::BooksRepository;
use crate::features::shared::pagination::{PagedRequest, SortDirection};
use crate::models::{Book, BookCreate, BookUpdate};

const BOOK_COLUMNS: &str = "id, name, price, category, author";

/// Columns a book listing may be ordered by
///
/// Requested names are matched case-insensitively; anything unrecognised
/// (including the default `"Id"`) orders by identifier. The SQL fragment is
/// always taken from this closed set, never from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSortColumn {
    Id,
    Name,
    Price,
    Category,
    Author,
}

impl BookSortColumn {
    pub fn resolve(requested: &str) -> Self {
        match requested.trim().to_lowercase().as_str() {
            "name" => BookSortColumn::Name,
            "price" => BookSortColumn::Price,
            "category" => BookSortColumn::Category,
            "author" => BookSortColumn::Author,
            _ => BookSortColumn::Id,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            BookSortColumn::Id => "id",
            BookSortColumn::Name => "name",
            BookSortColumn::Price => "price",
            BookSortColumn::Category => "category",
            BookSortColumn::Author => "author",
        }
    }

    /// In-process equivalent of the SQL ordering, id included as tie-breaker
    pub fn compare(self, a: &Book, b: &Book, direction: SortDirection) -> Ordering {
        let primary = match self {
            BookSortColumn::Id => Ordering::Equal,
            BookSortColumn::Name => a.name.cmp(&b.name),
            BookSortColumn::Price => a.price.cmp(&b.price),
            BookSortColumn::Category => a.category.cmp(&b.category),
            BookSortColumn::Author => a.author.cmp(&b.author),
        };
        let ordering = primary.then_with(|| a.id.cmp(&b.id));

        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// `ORDER BY` body for a request, e.g. `price DESC, id DESC`
pub fn order_by_clause(request: &PagedRequest) -> String {
    let column = BookSortColumn::resolve(&request.sort_column);
    let direction = request.sort_direction.as_sql();

    match column {
        BookSortColumn::Id => format!("id {direction}"),
        other => format!("{} {direction}, id {direction}", other.as_sql()),
    }
}

pub(crate) fn book_not_found(id: &str) -> AcmeError {
    AcmeError::not_found(format!("No book was found with Id {id}"))
}

#[derive(Debug, Clone)]
pub struct PgBooksRepository {
    pool: PgPool,
}

impl PgBooksRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BooksRepository for PgBooksRepository {
    #[tracing::instrument(skip(self), fields(page = request.page, page_size = request.page_size))]
    async fn find_page(&self, request: &PagedRequest) -> Result<Vec<Book>> {
        let offset = request.offset()?;
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY {} LIMIT $1 OFFSET $2",
            order_by_clause(request)
        );

        sqlx::query_as::<_, Book>(&sql)
            .bind(request.page_size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AcmeError::generic_with_source("Failed to load the requested page of books.", e))
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AcmeError::generic_with_source("Failed to count books.", e))
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> Result<Option<Book>> {
        sqlx::query_as::<_, Book>(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AcmeError::generic_with_source(format!("Failed to load book {id}"), e))
    }

    #[tracing::instrument(skip(self, book), fields(name = %book.name))]
    async fn create(&self, book: BookCreate) -> Result<Book> {
        let id = Uuid::new_v4().to_string();

        let created = sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books (id, name, price, category, author) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&id)
        .bind(&book.name)
        .bind(book.price)
        .bind(&book.category)
        .bind(&book.author)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AcmeError::generic_with_source(format!("Failed to create book {}", book.name), e))?;

        tracing::info!(book_id = %created.id, "Book {} created successfully", created.name);
        Ok(created)
    }

    #[tracing::instrument(skip(self, book), fields(book_id = %book.id))]
    async fn update(&self, book: BookUpdate) -> Result<Book> {
        let wrap = |e: sqlx::Error| {
            AcmeError::generic_with_source(format!("Failed to update book {}", book.id), e)
        };

        let mut tx = self.pool.begin().await.map_err(wrap)?;

        let exists = sqlx::query_scalar::<_, String>("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(&book.id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(wrap)?;
        if exists.is_none() {
            return Err(book_not_found(&book.id));
        }

        let updated = sqlx::query_as::<_, Book>(&format!(
            "UPDATE books SET name = $2, price = $3, category = $4, author = $5 \
             WHERE id = $1 RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&book.id)
        .bind(&book.name)
        .bind(book.price)
        .bind(&book.category)
        .bind(&book.author)
        .fetch_one(&mut *tx)
        .await
        .map_err(wrap)?;

        tx.commit().await.map_err(wrap)?;

        tracing::info!("Book {} updated successfully", updated.id);
        Ok(updated)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<()> {
        let wrap = |e: sqlx::Error| AcmeError::generic_with_source(format!("Failed to delete book {id}"), e);

        let mut tx = self.pool.begin().await.map_err(wrap)?;

        let exists = sqlx::query_scalar::<_, String>("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(wrap)?;
        if exists.is_none() {
            return Err(book_not_found(id));
        }

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(wrap)?;

        tx.commit().await.map_err(wrap)?;

        tracing::info!("Book {} deleted successfully", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn request(column: &str, direction: SortDirection) -> PagedRequest {
        PagedRequest::new(0, 20, column, direction)
    }

    fn book(id: &str, name: &str, price: i64) -> Book {
        Book {
            id: id.to_string(),
            name: name.to_string(),
            price: Decimal::from(price),
            category: "Fiction".to_string(),
            author: "Author".to_string(),
        }
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        assert_eq!(BookSortColumn::resolve("Name"), BookSortColumn::Name);
        assert_eq!(BookSortColumn::resolve("PRICE"), BookSortColumn::Price);
        assert_eq!(BookSortColumn::resolve(" category "), BookSortColumn::Category);
        assert_eq!(BookSortColumn::resolve("author"), BookSortColumn::Author);
    }

    #[test]
    fn test_resolve_falls_back_to_id() {
        assert_eq!(BookSortColumn::resolve("Id"), BookSortColumn::Id);
        assert_eq!(BookSortColumn::resolve(""), BookSortColumn::Id);
        assert_eq!(BookSortColumn::resolve("name; DROP TABLE books"), BookSortColumn::Id);
    }

    #[test]
    fn test_order_by_clause() {
        assert_eq!(order_by_clause(&request("Id", SortDirection::Ascending)), "id ASC");
        assert_eq!(
            order_by_clause(&request("price", SortDirection::Descending)),
            "price DESC, id DESC"
        );
        assert_eq!(order_by_clause(&request("unknown", SortDirection::Descending)), "id DESC");
    }

    #[test]
    fn test_compare_uses_id_as_tie_breaker() {
        let a = book("a", "Same", 10);
        let b = book("b", "Same", 10);

        assert_eq!(
            BookSortColumn::Name.compare(&a, &b, SortDirection::Ascending),
            Ordering::Less
        );
        assert_eq!(
            BookSortColumn::Price.compare(&a, &b, SortDirection::Descending),
            Ordering::Greater
        );
    }

    #[test]
    fn test_compare_by_price() {
        let cheap = book("z", "Cheap", 5);
        let pricey = book("a", "Pricey", 50);

        assert_eq!(
            BookSortColumn::Price.compare(&cheap, &pricey, SortDirection::Ascending),
            Ordering::Less
        );
        // id ordering ignores the other columns
        assert_eq!(
            BookSortColumn::Id.compare(&cheap, &pricey, SortDirection::Ascending),
            Ordering::Greater
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = book_not_found("42");
        assert_eq!(err.message(), "No book was found with Id 42");
        assert_eq!(err.key(), "Acme.EntityNotFound");
    }
}
