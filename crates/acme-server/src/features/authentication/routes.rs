//! Authentication API routes
//!
//! - `POST /api/v1/authentication` - Exchange credentials for a bearer token

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};

use super::commands::{AuthenticationResponseDto, LoginRequestDto};
use crate::auth::TokenService;
use crate::db::UsersRepository;
use crate::error::{AppError, ErrorResponse};
use crate::features::shared::ApiJson;
use crate::features::FeatureState;

pub fn authentication_routes() -> Router<FeatureState> {
    Router::new().route("/", post(authenticate))
}

/// Authenticate with email and password
#[utoipa::path(
    post,
    path = "/api/v1/authentication",
    tag = "authentication",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Access token issued", body = AuthenticationResponseDto),
        (status = 400, description = "Username or password is not valid", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn authenticate(
    State(users): State<Arc<dyn UsersRepository>>,
    State(tokens): State<Arc<TokenService>>,
    ApiJson(request): ApiJson<LoginRequestDto>,
) -> Result<Json<AuthenticationResponseDto>, AppError> {
    let response = super::commands::login::handle(users.as_ref(), &tokens, request).await?;
    Ok(Json(response))
}
