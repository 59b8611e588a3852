//! HTTP boundary for errors
//!
//! [`AppError`] is the only place where failures become responses. Domain
//! errors keep their key and message and get a status from
//! [`status_for`]. Faults outside the domain hierarchy (panics) are caught by
//! the middleware and rendered with [`ErrorResponse::unhandled`].
//!
//! Every error body has the same shape:
//!
//! ```json
//! { "error": "Acme.EntityNotFound", "message": "No book was found for identifier 42.", "statusCode": 404 }
//! ```

use std::collections::BTreeMap;

use acme_common::{AcmeError, ErrorKind};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Key used for faults outside the domain hierarchy
pub const UNHANDLED_ERROR_KEY: &str = "InternalServerError";

/// Message used for faults outside the domain hierarchy
pub const UNHANDLED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// Wire shape of every error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Machine readable key
    #[schema(example = "Acme.Validation-authentication#invalidEmailOrPassword")]
    pub error: String,

    #[schema(example = "Username or password is not valid.")]
    pub message: String,

    #[schema(example = 400)]
    pub status_code: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<BTreeMap<String, String>>,
}

impl ErrorResponse {
    pub fn unhandled() -> Self {
        Self {
            error: UNHANDLED_ERROR_KEY.to_string(),
            message: UNHANDLED_ERROR_MESSAGE.to_string(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            field_errors: None,
        }
    }

    fn from_domain(err: &AcmeError, status: StatusCode) -> Self {
        Self {
            error: err.key(),
            message: err.message().to_string(),
            status_code: status.as_u16(),
            field_errors: err.field_errors().cloned(),
        }
    }
}

/// Status code for each domain error kind
///
/// Generic errors are known to the application but unclassified, so they are
/// reported as a bad request rather than a server fault.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::EntityNotFound => StatusCode::NOT_FOUND,
        ErrorKind::Generic => StatusCode::BAD_REQUEST,
    }
}

/// Errors returned from route handlers
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] AcmeError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Domain(
            AcmeError::validation(rejection.body_text()).with_code("request#malformedBody"),
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::Domain(err) = self;
        let status = status_for(err.kind());
        if err.kind() == ErrorKind::Generic {
            tracing::error!(error = ?err, key = %err.key(), "Request failed");
        } else {
            tracing::debug!(key = %err.key(), message = %err.message(), "Request rejected");
        }

        (status, Json(ErrorResponse::from_domain(&err, status))).into_response()
    }
}
