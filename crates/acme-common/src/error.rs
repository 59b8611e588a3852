//! Domain error hierarchy
//!
//! Every layer below the HTTP boundary reports failures as an [`AcmeError`].
//! The boundary is the only place that turns a kind into a status code, so
//! nothing here knows about HTTP.
//!
//! Each error carries a machine-readable key built from the kind's base key
//! and an optional custom code:
//!
//! | Kind             | Base key               |
//! |------------------|------------------------|
//! | `Generic`        | `Acme`                 |
//! | `Validation`     | `Acme.Validation`      |
//! | `Forbidden`      | `Acme.Forbidden`       |
//! | `Unauthorized`   | `Acme.Unauthorized`    |
//! | `EntityNotFound` | `Acme.EntityNotFound`  |
//!
//! A custom code is appended with a dash, e.g.
//! `Acme.Validation-authentication#invalidEmailOrPassword`.

use std::collections::BTreeMap;

use thiserror::Error;

/// Result type alias for domain operations
pub type Result<T> = std::result::Result<T, AcmeError>;

/// Boxed underlying cause attached to generic errors
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Root of every error key
pub const ERROR_KEY_BASE: &str = "Acme";

/// Discriminant of [`AcmeError`], used by the HTTP boundary for its mapping table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Generic,
    Validation,
    Forbidden,
    Unauthorized,
    EntityNotFound,
}

impl ErrorKind {
    /// Key shared by every error of this kind
    pub fn base_key(self) -> &'static str {
        match self {
            ErrorKind::Generic => ERROR_KEY_BASE,
            ErrorKind::Validation => "Acme.Validation",
            ErrorKind::Forbidden => "Acme.Forbidden",
            ErrorKind::Unauthorized => "Acme.Unauthorized",
            ErrorKind::EntityNotFound => "Acme.EntityNotFound",
        }
    }
}

/// Application error hierarchy
#[derive(Error, Debug)]
pub enum AcmeError {
    /// Unexpected failure, typically a wrapped persistence error
    #[error("{message}")]
    Generic {
        message: String,
        code: Option<String>,
        #[source]
        source: Option<BoxError>,
    },

    /// Bad input
    #[error("{message}")]
    Validation {
        message: String,
        code: Option<String>,
        field_errors: BTreeMap<String, String>,
    },

    #[error("{message}")]
    Forbidden { message: String, code: Option<String> },

    #[error("{message}")]
    Unauthorized { message: String, code: Option<String> },

    /// A requested or targeted entity does not exist
    #[error("{message}")]
    EntityNotFound { message: String, code: Option<String> },
}

impl AcmeError {
    pub fn generic(message: impl Into<String>) -> Self {
        AcmeError::Generic {
            message: message.into(),
            code: None,
            source: None,
        }
    }

    /// Wraps a lower-level failure with context
    pub fn generic_with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        AcmeError::Generic {
            message: message.into(),
            code: None,
            source: Some(source.into()),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AcmeError::Validation {
            message: message.into(),
            code: None,
            field_errors: BTreeMap::new(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AcmeError::Forbidden {
            message: message.into(),
            code: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AcmeError::Unauthorized {
            message: message.into(),
            code: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AcmeError::EntityNotFound {
            message: message.into(),
            code: None,
        }
    }

    /// Attaches a custom code, appended to the kind's base key
    pub fn with_code(mut self, custom: impl Into<String>) -> Self {
        let slot = match &mut self {
            AcmeError::Generic { code, .. }
            | AcmeError::Validation { code, .. }
            | AcmeError::Forbidden { code, .. }
            | AcmeError::Unauthorized { code, .. }
            | AcmeError::EntityNotFound { code, .. } => code,
        };
        *slot = Some(custom.into());
        self
    }

    /// Records a per-field message. Ignored for kinds other than validation.
    pub fn with_field_error(mut self, field: impl Into<String>, error: impl Into<String>) -> Self {
        if let AcmeError::Validation { field_errors, .. } = &mut self {
            field_errors.insert(field.into(), error.into());
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AcmeError::Generic { .. } => ErrorKind::Generic,
            AcmeError::Validation { .. } => ErrorKind::Validation,
            AcmeError::Forbidden { .. } => ErrorKind::Forbidden,
            AcmeError::Unauthorized { .. } => ErrorKind::Unauthorized,
            AcmeError::EntityNotFound { .. } => ErrorKind::EntityNotFound,
        }
    }

    /// Human readable message
    pub fn message(&self) -> &str {
        match self {
            AcmeError::Generic { message, .. }
            | AcmeError::Validation { message, .. }
            | AcmeError::Forbidden { message, .. }
            | AcmeError::Unauthorized { message, .. }
            | AcmeError::EntityNotFound { message, .. } => message,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            AcmeError::Generic { code, .. }
            | AcmeError::Validation { code, .. }
            | AcmeError::Forbidden { code, .. }
            | AcmeError::Unauthorized { code, .. }
            | AcmeError::EntityNotFound { code, .. } => code.as_deref(),
        }
    }

    /// Machine readable key, e.g. `Acme.EntityNotFound` or
    /// `Acme.Validation-authentication#invalidEmailOrPassword`
    pub fn key(&self) -> String {
        let base = self.kind().base_key();
        match self.code() {
            Some(code) => format!("{base}-{code}"),
            None => base.to_string(),
        }
    }

    /// Field errors of a validation error; empty for every other kind
    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            AcmeError::Validation { field_errors, .. } if !field_errors.is_empty() => {
                Some(field_errors)
            },
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_base_keys_per_kind() {
        assert_eq!(AcmeError::generic("x").key(), "Acme");
        assert_eq!(AcmeError::validation("x").key(), "Acme.Validation");
        assert_eq!(AcmeError::forbidden("x").key(), "Acme.Forbidden");
        assert_eq!(AcmeError::unauthorized("x").key(), "Acme.Unauthorized");
        assert_eq!(AcmeError::not_found("x").key(), "Acme.EntityNotFound");
    }

    #[test]
    fn test_custom_code_is_appended() {
        let err = AcmeError::validation("Username or password is not valid.")
            .with_code("authentication#invalidEmailOrPassword");

        assert_eq!(err.key(), "Acme.Validation-authentication#invalidEmailOrPassword");
        assert_eq!(err.code(), Some("authentication#invalidEmailOrPassword"));
        assert_eq!(err.to_string(), "Username or password is not valid.");
    }

    #[test]
    fn test_generic_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = AcmeError::generic_with_source("Failed to create book Dune", io);

        assert_eq!(err.kind(), ErrorKind::Generic);
        assert_eq!(err.message(), "Failed to create book Dune");
        assert_eq!(err.source().unwrap().to_string(), "disk gone");
    }

    #[test]
    fn test_field_errors_only_on_validation() {
        let err = AcmeError::validation("Invalid book").with_field_error("name", "required");
        assert_eq!(err.field_errors().unwrap().get("name").unwrap(), "required");

        let err = AcmeError::not_found("missing").with_field_error("name", "required");
        assert!(err.field_errors().is_none());

        assert!(AcmeError::validation("empty").field_errors().is_none());
    }
}
