//! Operator commands behind the `census-cli` binary.
//!
//! There is no login endpoint, so [`issue_token`] is how bearer tokens are
//! obtained. [`init_repository`] and [`seed_persons`] prepare a database for
//! local runs.

use census_auth::{AuthError, create_access_token};
use census_config::{DatabaseConfig, JwtConfig};
use census_core::RepositoryError;
use census_db::{TableName, init_db_pool};
use fake::Fake;
use fake::faker::name::en::Name;

use crate::modules::persons::{MAX_NAME_LEN, PersonRepository, PgPersonRepository};
use crate::utils::tracing::Tracer;

pub struct PersonSeed {
    pub name: String,
    pub age: i32,
}

/// Mints a token for `subject`. `ttl` overrides `JWT_ACCESS_EXPIRY`.
pub fn issue_token(
    subject: &str,
    ttl: Option<i64>,
    jwt_config: &JwtConfig,
) -> Result<String, AuthError> {
    let mut config = jwt_config.clone();
    if let Some(ttl) = ttl {
        config.access_token_expiry = ttl;
    }
    create_access_token(subject, &config)
}

/// Connects and creates the person table if it is missing.
pub async fn init_repository(
    db_config: &DatabaseConfig,
    tracer: Tracer,
) -> anyhow::Result<PgPersonRepository> {
    let table = TableName::parse(&db_config.table)?;
    let pool = init_db_pool(db_config).await?;
    Ok(PgPersonRepository::new(pool, table, tracer).await?)
}

pub fn generate_persons(count: usize) -> Vec<PersonSeed> {
    (0..count)
        .map(|_| {
            let name: String = Name().fake();
            PersonSeed {
                name: name.chars().take(MAX_NAME_LEN).collect(),
                age: (0..100).fake::<i32>(),
            }
        })
        .collect()
}

/// Inserts `count` fake persons and returns their ids.
pub async fn seed_persons(
    repo: &dyn PersonRepository,
    count: usize,
) -> Result<Vec<i32>, RepositoryError> {
    let mut ids = Vec::with_capacity(count);
    for seed in generate_persons(count) {
        ids.push(repo.create(&seed.name, seed.age).await?);
    }
    Ok(ids)
}
