//! Search books query
//!
//! Paging is validated before either query runs. The page and the total
//! are fetched with two separate repository calls.

use acme_common::Result;

use crate::db::BooksRepository;
use crate::features::books::types::BookDto;
use crate::features::shared::pagination::{PagedRequest, PagedRequestDto, PagedResponseDto};

#[tracing::instrument(skip(books))]
pub async fn handle(
    books: &dyn BooksRepository,
    request: PagedRequestDto,
) -> Result<PagedResponseDto<BookDto>> {
    let request = PagedRequest::from(request);
    request.validate()?;

    let total = books.count().await?;
    let items = books.find_page(&request).await?;

    tracing::debug!(total, returned = items.len(), "Books page fetched");

    Ok(PagedResponseDto::new(&request, total, items).map(BookDto::from))
}
