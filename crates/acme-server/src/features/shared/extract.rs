//! Request body extraction

use axum::{
    extract::FromRequest,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::AppError;

/// `axum::Json` whose rejection is rendered like every other error
///
/// Missing fields, wrong types and syntax errors become a 400 with the
/// `Acme.Validation-request#malformedBody` key instead of axum's plain-text
/// rejection.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}
