//! Wire shapes for the books API

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Book;

/// A book as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    #[schema(example = "0b7c7f4e-2f1e-4c4b-9a59-5d2f3f7d1c11")]
    pub id: String,

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

impl From<Book> for BookDto {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            name: book.name,
            price: book.price,
            category: book.category,
            author: book.author,
        }
    }
}
