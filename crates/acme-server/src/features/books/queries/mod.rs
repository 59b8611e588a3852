pub mod get;
pub mod search;

pub use get::GetBookQuery;
