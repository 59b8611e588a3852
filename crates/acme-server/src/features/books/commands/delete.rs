//! Delete book command

use acme_common::Result;

use crate::db::BooksRepository;

#[derive(Debug, Clone)]
pub struct DeleteBookCommand {
    pub id: String,
}

/// Not-found from the repository when the book does not exist
#[tracing::instrument(skip(books))]
pub async fn handle(books: &dyn BooksRepository, command: DeleteBookCommand) -> Result<()> {
    books.delete(&command.id).await
}
