//! # Census DB
//!
//! PostgreSQL connection pool initialization and the validated [`TableName`]
//! the person repository is scoped to.
//!
//! # Example
//!
//! ```ignore
//! use census_config::DatabaseConfig;
//! use census_db::{TableName, init_db_pool};
//!
//! let config = DatabaseConfig::from_env()?;
//! let table = TableName::parse(&config.table)?;
//! let pool = init_db_pool(&config).await?;
//! ```

pub mod table;

use census_config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;

/// Connects a PostgreSQL pool sized by `DATABASE_MAX_CONNECTIONS`.
///
/// The returned pool is cheaply cloneable and safe to share across tasks; it
/// is the only synchronization the repository relies on.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}

// Re-export for convenience
pub use sqlx::PgPool;
pub use table::{TableName, TableNameError};
