//! Books API routes
//!
//! Every route requires a bearer token.
//!
//! # Route Structure
//!
//! - `POST /api/v1/books/search` - One page of books
//! - `GET /api/v1/books/:id` - A single book
//! - `POST /api/v1/books` - Create a book
//! - `PUT /api/v1/books/:id` - Replace a book
//! - `DELETE /api/v1/books/:id` - Delete a book

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::{
    commands::{CreateBookCommand, DeleteBookCommand, UpdateBookCommand},
    queries::GetBookQuery,
    types::BookDto,
};
use crate::auth::AuthenticatedUser;
use crate::db::BooksRepository;
use crate::error::{AppError, ErrorResponse};
use crate::features::shared::{ApiJson, PagedRequestDto, PagedResponseDto};
use crate::features::FeatureState;

/// Prefix used to build the `Location` of created books
pub const BOOKS_PATH: &str = "/api/v1/books";

pub fn books_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", post(create_book))
        .route("/search", post(search_books))
        .route("/:id", get(get_book).put(update_book).delete(delete_book))
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// Search books
///
/// Unknown sort columns order by identifier.
#[utoipa::path(
    post,
    path = "/api/v1/books/search",
    tag = "books",
    request_body = PagedRequestDto,
    responses(
        (status = 200, description = "One page of books", body = PagedResponseDto<BookDto>),
        (status = 400, description = "Page or page size out of range", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all, fields(user = %user.username))]
pub async fn search_books(
    user: AuthenticatedUser,
    State(books): State<Arc<dyn BooksRepository>>,
    ApiJson(request): ApiJson<PagedRequestDto>,
) -> Result<Json<PagedResponseDto<BookDto>>, AppError> {
    let page = super::queries::search::handle(books.as_ref(), request).await?;
    Ok(Json(page))
}

/// Get a book by identifier
#[utoipa::path(
    get,
    path = "/api/v1/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "The book", body = BookDto),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "No book with this identifier", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(user, books), fields(user = %user.username))]
pub async fn get_book(
    user: AuthenticatedUser,
    State(books): State<Arc<dyn BooksRepository>>,
    Path(id): Path<String>,
) -> Result<Json<BookDto>, AppError> {
    let book = super::queries::get::handle(books.as_ref(), GetBookQuery { id }).await?;
    Ok(Json(book))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Create a book
///
/// Responds with the stored book and its `Location`.
#[utoipa::path(
    post,
    path = "/api/v1/books",
    tag = "books",
    request_body = CreateBookCommand,
    responses(
        (status = 201, description = "Book created", body = BookDto,
            headers(("Location" = String, description = "URL of the new book"))),
        (status = 400, description = "Invalid book", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all, fields(user = %user.username, name = %command.name))]
pub async fn create_book(
    user: AuthenticatedUser,
    State(books): State<Arc<dyn BooksRepository>>,
    ApiJson(command): ApiJson<CreateBookCommand>,
) -> Result<Response, AppError> {
    let book = super::commands::create::handle(books.as_ref(), command).await?;

    tracing::info!(book_id = %book.id, "Book created via API");

    let location = format!("{BOOKS_PATH}/{}", book.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(book)).into_response())
}

/// Replace every field of a book
#[utoipa::path(
    put,
    path = "/api/v1/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book identifier")),
    request_body = UpdateBookCommand,
    responses(
        (status = 204, description = "Book updated"),
        (status = 400, description = "Identifier mismatch or invalid book", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "No book with this identifier", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(user, books, command), fields(user = %user.username))]
pub async fn update_book(
    user: AuthenticatedUser,
    State(books): State<Arc<dyn BooksRepository>>,
    Path(id): Path<String>,
    ApiJson(command): ApiJson<UpdateBookCommand>,
) -> Result<StatusCode, AppError> {
    command.ensure_route_id(&id)?;

    super::commands::update::handle(books.as_ref(), command).await?;

    tracing::info!(book_id = %id, "Book updated via API");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/api/v1/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book identifier")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "No book with this identifier", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(user, books), fields(user = %user.username))]
pub async fn delete_book(
    user: AuthenticatedUser,
    State(books): State<Arc<dyn BooksRepository>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    super::commands::delete::handle(books.as_ref(), DeleteBookCommand { id: id.clone() }).await?;

    tracing::info!(book_id = %id, "Book deleted via API");
    Ok(StatusCode::NO_CONTENT)
}
