//! Shared paging types
//!
//! A paged request is a 0-based page index, a page size, a free-text sort
//! column and a direction. The response echoes the request and adds the
//! total number of items.
//!
//! # Examples
//!
//! ```rust,ignore
//! use acme_server::features::shared::pagination::{PagedRequest, SortDirection};
//!
//! let request = PagedRequest::new(2, 20, "price", SortDirection::Descending);
//! request.validate()?;
//! assert_eq!(request.offset()?, 40);
//! ```

use acme_common::{AcmeError, Result};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Default page index
pub const DEFAULT_PAGE: i64 = 0;

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Default sort column; resolves to ordering by identifier
pub const DEFAULT_SORT_COLUMN: &str = "Id";

const OUT_OF_RANGE_CODE: &str = "paging#outOfRange";

/// Sort direction, serialized as `"Ascending"` / `"Descending"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Domain paging request handed to repositories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedRequest {
    pub page: i64,
    pub page_size: i64,
    pub sort_column: String,
    pub sort_direction: SortDirection,
}

impl Default for PagedRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort_column: DEFAULT_SORT_COLUMN.to_string(),
            sort_direction: SortDirection::Ascending,
        }
    }
}

impl PagedRequest {
    pub fn new(
        page: i64,
        page_size: i64,
        sort_column: impl Into<String>,
        sort_direction: SortDirection,
    ) -> Self {
        Self {
            page,
            page_size,
            sort_column: sort_column.into(),
            sort_direction,
        }
    }

    /// Rejects a negative page or a non-positive page size
    pub fn validate(&self) -> Result<()> {
        if self.page < 0 {
            return Err(AcmeError::validation(format!(
                "Page index {} is out of range; it must be 0 or greater.",
                self.page
            ))
            .with_code(OUT_OF_RANGE_CODE)
            .with_field_error("page", "must be 0 or greater"));
        }

        if self.page_size <= 0 {
            return Err(AcmeError::validation(format!(
                "Page size {} is out of range; it must be greater than 0.",
                self.page_size
            ))
            .with_code(OUT_OF_RANGE_CODE)
            .with_field_error("pageSize", "must be greater than 0"));
        }

        Ok(())
    }

    /// Number of rows to skip, `page * page_size`
    pub fn offset(&self) -> Result<i64> {
        self.validate()?;
        self.page.checked_mul(self.page_size).ok_or_else(|| {
            AcmeError::validation("Requested page is out of range.")
                .with_code(OUT_OF_RANGE_CODE)
                .with_field_error("page", "page * pageSize is too large")
        })
    }
}

// ============================================================================
// Wire shapes
// ============================================================================

/// Paging and sorting request body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PagedRequestDto {
    /// 0-based page index
    #[schema(example = 0)]
    pub page: i64,

    #[schema(example = 20)]
    pub page_size: i64,

    /// One of name, price, category, author (case-insensitive); anything else sorts by id
    #[schema(example = "Id")]
    pub sort_column: String,

    pub sort_direction: SortDirection,
}

impl Default for PagedRequestDto {
    fn default() -> Self {
        PagedRequest::default().into()
    }
}

impl From<PagedRequestDto> for PagedRequest {
    fn from(dto: PagedRequestDto) -> Self {
        PagedRequest {
            page: dto.page,
            page_size: dto.page_size,
            sort_column: dto.sort_column,
            sort_direction: dto.sort_direction,
        }
    }
}

impl From<PagedRequest> for PagedRequestDto {
    fn from(request: PagedRequest) -> Self {
        PagedRequestDto {
            page: request.page,
            page_size: request.page_size,
            sort_column: request.sort_column,
            sort_direction: request.sort_direction,
        }
    }
}

/// The request's paging fields plus the total number of items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagingDataDto {
    pub page: i64,
    pub page_size: i64,
    pub sort_column: String,
    pub sort_direction: SortDirection,
    pub total_items: i64,
}

impl PagingDataDto {
    pub fn new(request: &PagedRequest, total_items: i64) -> Self {
        Self {
            page: request.page,
            page_size: request.page_size,
            sort_column: request.sort_column.clone(),
            sort_direction: request.sort_direction,
            total_items,
        }
    }
}

/// One page of items
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponseDto<T> {
    pub paging_data: PagingDataDto,
    pub items: Vec<T>,
}

impl<T> PagedResponseDto<T> {
    pub fn new(request: &PagedRequest, total_items: i64, items: Vec<T>) -> Self {
        Self {
            paging_data: PagingDataDto::new(request, total_items),
            items,
        }
    }

    /// Converts every item, keeping the paging data
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResponseDto<U> {
        PagedResponseDto {
            paging_data: self.paging_data,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acme_common::ErrorKind;

    #[test]
    fn test_defaults() {
        let request = PagedRequest::default();
        assert_eq!(request.page, 0);
        assert_eq!(request.page_size, 20);
        assert_eq!(request.sort_column, "Id");
        assert_eq!(request.sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PagedRequest::new(0, 20, "Id", SortDirection::Ascending).offset().unwrap(), 0);
        assert_eq!(PagedRequest::new(3, 25, "Id", SortDirection::Ascending).offset().unwrap(), 75);
    }

    #[test]
    fn test_negative_page_is_out_of_range() {
        let err = PagedRequest::new(-1, 20, "Id", SortDirection::Ascending)
            .validate()
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.key(), "Acme.Validation-paging#outOfRange");
        assert!(err.field_errors().unwrap().contains_key("page"));
    }

    #[test]
    fn test_non_positive_page_size_is_out_of_range() {
        for size in [0, -5] {
            let err = PagedRequest::new(0, size, "Id", SortDirection::Ascending)
                .validate()
                .unwrap_err();
            assert!(err.field_errors().unwrap().contains_key("pageSize"));
        }
    }

    #[test]
    fn test_offset_overflow_is_rejected() {
        let request = PagedRequest::new(i64::MAX, 2, "Id", SortDirection::Ascending);
        assert!(request.offset().is_err());
    }

    #[test]
    fn test_dto_defaults_apply_to_missing_fields() {
        let dto: PagedRequestDto = serde_json::from_str(r#"{"page": 2}"#).unwrap();
        assert_eq!(dto.page, 2);
        assert_eq!(dto.page_size, 20);
        assert_eq!(dto.sort_column, "Id");
        assert_eq!(dto.sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn test_sort_direction_wire_format() {
        let json = serde_json::to_string(&SortDirection::Descending).unwrap();
        assert_eq!(json, r#""Descending""#);
        assert!(serde_json::from_str::<SortDirection>(r#""Sideways""#).is_err());
    }

    #[test]
    fn test_response_echoes_request() {
        let request = PagedRequest::new(1, 2, "name", SortDirection::Descending);
        let response = PagedResponseDto::new(&request, 5, vec![1, 2]).map(|n| n * 10);

        assert_eq!(response.paging_data.total_items, 5);
        assert_eq!(response.paging_data.sort_column, "name");
        assert_eq!(response.items, vec![10, 20]);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["pagingData"]["pageSize"], 2);
        assert_eq!(json["pagingData"]["sortDirection"], "Descending");
        assert_eq!(json["pagingData"]["totalItems"], 5);
    }
}
