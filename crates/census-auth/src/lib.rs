//! # Census Auth
//!
//! Bearer token types and JWT utilities for the Census person service.
//!
//! - [`claims`]: the claim set carried by access tokens
//! - [`jwt`]: token minting and verification, with [`AuthError`] separating
//!   server misconfiguration from client credential problems
//!
//! # Example
//!
//! ```ignore
//! use census_auth::{create_access_token, verify_token};
//! use census_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token("alice", &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.sub, "alice");
//! ```

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::Claims;
pub use jwt::{AuthError, create_access_token, encode_claims, verify_token};
