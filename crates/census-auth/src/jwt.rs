//! JWT utilities for the bearer-token gate.
//!
//! Tokens are HS256-signed with the configured secret. `exp` is required and
//! `nbf` is checked when the token carries one.

use census_config::JwtConfig;
use census_core::AppError;
use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind as JwtErrorKind,
};

use crate::claims::Claims;

/// Why a credential was not accepted.
///
/// [`AuthError::MissingSecret`] and [`AuthError::Encode`] are server faults;
/// every other variant is a client credential problem.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("JWT secret is not configured")]
    MissingSecret,

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Malformed token")]
    Malformed,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token is not valid yet")]
    NotYetValid,

    #[error("Failed to create token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::MissingSecret | Self::Encode(_))
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        if err.is_server_error() {
            AppError::internal(err)
        } else {
            AppError::unauthorized(err)
        }
    }
}

fn secret(jwt_config: &JwtConfig) -> Result<&[u8], AuthError> {
    match jwt_config.secret.as_deref() {
        Some(secret) if !secret.is_empty() => Ok(secret.as_bytes()),
        _ => Err(AuthError::MissingSecret),
    }
}

/// Signs an arbitrary claim set. Used directly by tests that need expired or
/// not-yet-valid tokens.
pub fn encode_claims(claims: &Claims, jwt_config: &JwtConfig) -> Result<String, AuthError> {
    let key = EncodingKey::from_secret(secret(jwt_config)?);
    encode(&Header::new(Algorithm::HS256), claims, &key).map_err(AuthError::Encode)
}

/// Mints an access token for `subject` valid for `access_token_expiry` seconds.
pub fn create_access_token(subject: &str, jwt_config: &JwtConfig) -> Result<String, AuthError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry.max(0) as usize;

    let claims = Claims {
        sub: subject.to_string(),
        exp,
        iat: now,
        nbf: None,
    };

    encode_claims(&claims, jwt_config)
}

/// Verifies a token and returns its claims.
///
/// The secret is checked before the token so a misconfigured server never
/// reports a credential problem.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(secret(jwt_config)?);

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_nbf = true;
    // No grace period: a token is rejected the second its `exp` passes
    validation.leeway = 0;

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            JwtErrorKind::ExpiredSignature => AuthError::Expired,
            JwtErrorKind::ImmatureSignature => AuthError::NotYetValid,
            JwtErrorKind::InvalidSignature => AuthError::InvalidSignature,
            _ => AuthError::Malformed,
        })
}
