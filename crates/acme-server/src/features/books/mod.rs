//! Books feature
//!
//! CRUD and paged search over the book catalogue, split into commands
//! (writes) and queries (reads). Handlers take the repository as a
//! `&dyn BooksRepository` so they run unchanged against PostgreSQL or the
//! in-memory store.

pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use commands::{CreateBookCommand, DeleteBookCommand, UpdateBookCommand};
pub use queries::GetBookQuery;
pub use routes::books_routes;
pub use types::BookDto;
