use std::sync::Arc;

use census_config::{DatabaseConfig, JwtConfig};
use census_db::{TableName, init_db_pool};

use crate::modules::persons::{PersonRepository, PgPersonRepository};
use crate::utils::tracing::Tracer;

#[derive(Clone)]
pub struct AppState {
    pub persons: Arc<dyn PersonRepository>,
    pub jwt_config: JwtConfig,
    pub tracer: Tracer,
}

impl AppState {
    pub fn new(persons: Arc<dyn PersonRepository>, jwt_config: JwtConfig, tracer: Tracer) -> Self {
        Self {
            persons,
            jwt_config,
            tracer,
        }
    }
}

/// Connects to PostgreSQL and prepares the person table. Nothing is served
/// until this returns.
pub async fn init_app_state(
    db_config: &DatabaseConfig,
    jwt_config: JwtConfig,
    tracer: Tracer,
) -> anyhow::Result<AppState> {
    let table = TableName::parse(&db_config.table)?;
    let pool = init_db_pool(db_config).await?;
    let persons = PgPersonRepository::new(pool, table, tracer.clone()).await?;

    Ok(AppState::new(Arc::new(persons), jwt_config, tracer))
}
