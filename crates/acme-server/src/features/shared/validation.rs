//! Shared validation utilities
//!
//! Field checks return small typed errors; [`FieldErrors`] gathers them into a
//! single validation [`AcmeError`] carrying one entry per failing field.
//!
//! # Examples
//!
//! ```rust,ignore
//! use acme_server::features::shared::validation::{validate_price, validate_text, FieldErrors};
//!
//! let mut errors = FieldErrors::default();
//! errors.check("name", validate_text(&name, 256));
//! errors.check("price", validate_price(price));
//! errors.into_result("The book is not valid.")?;
//! ```

use std::collections::BTreeMap;
use std::fmt::Display;

use acme_common::{AcmeError, Result};
use rust_decimal::Decimal;
use thiserror::Error;

/// Largest scale storable in a `NUMERIC(18, 2)` column
pub const PRICE_MAX_SCALE: u32 = 2;

/// Errors that can occur during free-text validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TextValidationError {
    #[error("is required and cannot be empty")]
    Required,

    #[error("must be between 1 and {max_length} characters")]
    TooLong { max_length: usize },
}

/// Errors that can occur during price validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PriceValidationError {
    #[error("cannot be negative")]
    Negative,

    #[error("cannot have more than {max_scale} decimal places")]
    TooPrecise { max_scale: u32 },

    #[error("must be less than {max}")]
    TooLarge { max: Decimal },
}

/// Required text: non-blank and at most `max_length` characters
pub fn validate_text(value: &str, max_length: usize) -> std::result::Result<(), TextValidationError> {
    if value.trim().is_empty() {
        return Err(TextValidationError::Required);
    }

    if value.chars().count() > max_length {
        return Err(TextValidationError::TooLong { max_length });
    }

    Ok(())
}

/// Non-negative and representable as `NUMERIC(18, 2)`
pub fn validate_price(price: Decimal) -> std::result::Result<(), PriceValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(PriceValidationError::Negative);
    }

    if price.normalize().scale() > PRICE_MAX_SCALE {
        return Err(PriceValidationError::TooPrecise {
            max_scale: PRICE_MAX_SCALE,
        });
    }

    let max = Decimal::from(10_000_000_000_000_000_i64);
    if price >= max {
        return Err(PriceValidationError::TooLarge { max });
    }

    Ok(())
}

/// Collects per-field failures
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    /// Records `result`'s error under `field`; the first failure per field wins
    pub fn check<E: Display>(&mut self, field: &str, result: std::result::Result<(), E>) -> &mut Self {
        if let Err(e) = result {
            self.errors
                .entry(field.to_string())
                .or_insert_with(|| e.to_string());
        }
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok` when nothing failed, otherwise a validation error with `message`
    pub fn into_result(self, message: &str) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }

        tracing::debug!(fields = ?self.errors.keys().collect::<Vec<_>>(), "Validation failed");

        Err(self
            .errors
            .into_iter()
            .fold(AcmeError::validation(message), |err, (field, reason)| {
                err.with_field_error(field, reason)
            }))
    }
}
