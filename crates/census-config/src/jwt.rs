//! JWT configuration.
//!
//! - `JWT_SECRET`: HMAC signing secret. Optional at load time so the service
//!   can start, but every authenticated request fails with a server error
//!   until it is set.
//! - `JWT_ACCESS_EXPIRY`: lifetime in seconds of tokens minted by the CLI
//!   (default: 3600).

use std::env;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JwtConfig {
    pub secret: Option<String>,
    pub access_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
            access_token_expiry: env::var("JWT_ACCESS_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600), // 1 hour
        }
    }

    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: Some(secret.into()),
            ..Self::default()
        }
    }

    /// Whether a non-empty signing secret is present.
    pub fn is_configured(&self) -> bool {
        self.secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            access_token_expiry: 3600,
        }
    }
}
