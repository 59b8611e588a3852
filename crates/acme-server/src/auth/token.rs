//! Bearer token minting and validation (HS512 JWT)

use acme_common::{AcmeError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::TokenConfig;
use crate::models::{ApplicationUser, Token};

const ALGORITHM: Algorithm = Algorithm::HS512;

/// Claims carried by every access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub unique_name: String,
    /// User identifier
    pub nameid: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Signs and verifies access tokens with a shared symmetric secret
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: i64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &ALGORITHM)
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            lifetime_secs: config.jwt_expiration_secs,
        }
    }

    /// Mints a token valid from now until now + the configured lifetime
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    pub fn issue(&self, user: &ApplicationUser) -> Result<Token> {
        let created = Utc::now();
        let expires = Duration::try_seconds(self.lifetime_secs)
            .and_then(|lifetime| created.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AcmeError::generic(format!(
                    "The token lifetime of {} seconds is out of range.",
                    self.lifetime_secs
                ))
            })?;
        let claims = Claims {
            unique_name: user.username.clone(),
            nameid: user.id.clone(),
            iat: created.timestamp(),
            nbf: created.timestamp(),
            exp: expires.timestamp(),
        };

        let access_token = encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(|e| AcmeError::generic_with_source("Failed to sign the access token.", e))?;

        Ok(Token {
            access_token,
            created,
            expires,
        })
    }

    /// Checks signature, algorithm and validity window with no clock skew
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_nbf = true;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected bearer token");
                AcmeError::unauthorized("The bearer token is invalid or has expired.")
            })
    }
}
