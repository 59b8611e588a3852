//! Shared utilities and types for feature modules
//!
//! # Contents
//!
//! - **pagination**: paged request/response types
//! - **validation**: field checks and the error collector
//! - **extract**: JSON extractor reporting bad bodies as validation errors

pub mod extract;
pub mod pagination;
pub mod validation;

pub use extract::ApiJson;
pub use pagination::{PagedRequest, PagedRequestDto, PagedResponseDto, PagingDataDto, SortDirection};
pub use validation::{validate_price, validate_text, FieldErrors};
