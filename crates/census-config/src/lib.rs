//! # Census Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`database`]: PostgreSQL connection and person table settings
//! - [`jwt`]: bearer token signing secret and expiry
//! - [`server`]: listener address
//!
//! # Example
//!
//! ```ignore
//! use census_config::{DatabaseConfig, JwtConfig, ServerConfig};
//!
//! let database_config = DatabaseConfig::from_env()?;
//! let jwt_config = JwtConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

pub mod database;
pub mod jwt;
pub mod server;

// Re-export commonly used types at crate root
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;
