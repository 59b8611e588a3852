//! ACME Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
//!
//! Types shared by every ACME workspace member.
//!
//! - **Error Handling**: the [`AcmeError`] domain hierarchy and its [`Result`] alias
//! - **Logging**: tracing subscriber setup driven by [`logging::LogConfig`]
//!
//! # Example
//!
//! ```no_run
//! use acme_common::{AcmeError, Result};
//!
//! fn find_book(id: &str) -> Result<()> {
//!     Err(AcmeError::not_found(format!("No book was found for identifier {id}.")))
//! }
//! ```

pub mod error;
pub mod logging;

pub use error::{AcmeError, ErrorKind, Result};
