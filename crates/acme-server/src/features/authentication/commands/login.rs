//! Login command
//!
//! An unknown email, a wrong password and blank fields all produce the same
//! validation error so callers cannot tell which accounts exist.

use acme_common::{AcmeError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::TokenService;
use crate::db::UsersRepository;
use crate::models::{AuthenticationResponse, Token};

pub const INVALID_CREDENTIALS_CODE: &str = "authentication#invalidEmailOrPassword";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Username or password is not valid.";

/// Credentials posted to the authentication endpoint
#[derive(Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequestDto {
    #[schema(example = "admin@acme.com")]
    pub email: String,

    #[schema(example = "pa$$w0rd")]
    pub password: String,
}

impl std::fmt::Debug for LoginRequestDto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequestDto")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenDto {
    pub access_token: String,
    pub created_date_time_utc: DateTime<Utc>,
    pub expiration_date_time_utc: DateTime<Utc>,
}

impl From<Token> for TokenDto {
    fn from(token: Token) -> Self {
        Self {
            access_token: token.access_token,
            created_date_time_utc: token.created,
            expiration_date_time_utc: token.expires,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResponseDto {
    pub user_id: String,
    pub username: String,
    pub token: TokenDto,
}

impl From<AuthenticationResponse> for AuthenticationResponseDto {
    fn from(response: AuthenticationResponse) -> Self {
        Self {
            user_id: response.user_id,
            username: response.username,
            token: response.token.into(),
        }
    }
}

fn invalid_credentials() -> AcmeError {
    AcmeError::validation(INVALID_CREDENTIALS_MESSAGE).with_code(INVALID_CREDENTIALS_CODE)
}

#[tracing::instrument(skip(users, tokens, request), fields(email = %request.email))]
pub async fn handle(
    users: &dyn UsersRepository,
    tokens: &TokenService,
    request: LoginRequestDto,
) -> Result<AuthenticationResponseDto> {
    if request.email.trim().is_empty() || request.password.trim().is_empty() {
        return Err(invalid_credentials());
    }

    let user = users
        .find_by_email_and_password(request.email.trim(), &request.password)
        .await?
        .ok_or_else(|| {
            tracing::debug!("Credentials rejected");
            invalid_credentials()
        })?;

    let token = tokens.issue(&user)?;

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

    Ok(AuthenticationResponse {
        user_id: user.id,
        username: user.username,
        token,
    }
    .into())
}
