use async_trait::async_trait;
use census_core::RepositoryError;
use census_db::{PgPool, TableName};

use crate::repository_span;
use crate::utils::tracing::Tracer;

use super::model::Person;
use super::repository::{PersonRepository, RESOURCE};

const SYSTEM: &str = "postgresql";

/// SQL for one table, rendered once from the validated table name.
#[derive(Debug)]
struct Queries {
    create_table: String,
    insert: String,
    select_all: String,
    select_one: String,
    update: String,
    delete: String,
    count: String,
}

impl Queries {
    fn new(table: &TableName) -> Self {
        let t = table.as_str();
        Self {
            create_table: format!(
                "CREATE TABLE IF NOT EXISTS {t} (\
                 id SERIAL PRIMARY KEY, \
                 name VARCHAR(50) NOT NULL, \
                 age INT NOT NULL)"
            ),
            insert: format!("INSERT INTO {t} (name, age) VALUES ($1, $2) RETURNING id"),
            select_all: format!("SELECT id, name, age FROM {t} ORDER BY id"),
            select_one: format!("SELECT id, name, age FROM {t} WHERE id = $1"),
            update: format!("UPDATE {t} SET name = $1, age = $2 WHERE id = $3"),
            delete: format!("DELETE FROM {t} WHERE id = $1"),
            count: format!("SELECT COUNT(*) FROM {t}"),
        }
    }
}

pub struct PgPersonRepository {
    pool: PgPool,
    table: TableName,
    tracer: Tracer,
    queries: Queries,
}

impl PgPersonRepository {
    /// Creates the table if it does not exist yet. The repository is only
    /// returned once the table is in place.
    pub async fn new(pool: PgPool, table: TableName, tracer: Tracer) -> Result<Self, RepositoryError> {
        let queries = Queries::new(&table);
        sqlx::query(&queries.create_table)
            .execute(&pool)
            .await
            .map_err(map_db_error)?;

        tracing::info!(table = %table, "Person table ready");

        Ok(Self {
            pool,
            table,
            tracer,
            queries,
        })
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }
}

/// Length, null and check violations are the caller's fault; anything else
/// is internal.
fn map_db_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err
        && let Some(code) = db_err.code()
        && matches!(code.as_ref(), "22001" | "23502" | "23514")
    {
        return RepositoryError::Validation(db_err.message().to_string());
    }
    RepositoryError::internal(err)
}

#[async_trait]
impl PersonRepository for PgPersonRepository {
    async fn create(&self, name: &str, age: i32) -> Result<i32, RepositoryError> {
        let span = self
            .tracer
            .span(|| repository_span!("Create", SYSTEM, self.table.as_str()));
        self.tracer
            .trace(span, async {
                sqlx::query_scalar::<_, i32>(&self.queries.insert)
                    .bind(name)
                    .bind(age)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_db_error)
            })
            .await
    }

    async fn find_all(&self) -> Result<Vec<Person>, RepositoryError> {
        let span = self
            .tracer
            .span(|| repository_span!("FindAll", SYSTEM, self.table.as_str()));
        self.tracer
            .trace(span, async {
                sqlx::query_as::<_, Person>(&self.queries.select_all)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_db_error)
            })
            .await
    }

    async fn find_by_id(&self, id: i32) -> Result<Person, RepositoryError> {
        let span = self
            .tracer
            .span(|| repository_span!("FindById", SYSTEM, self.table.as_str()));
        self.tracer
            .trace(span, async {
                sqlx::query_as::<_, Person>(&self.queries.select_one)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_db_error)?
                    .ok_or_else(|| RepositoryError::not_found(RESOURCE, id))
            })
            .await
    }

    async fn update(&self, id: i32, name: &str, age: i32) -> Result<(), RepositoryError> {
        let span = self
            .tracer
            .span(|| repository_span!("Update", SYSTEM, self.table.as_str()));
        self.tracer
            .trace(span, async {
                sqlx::query(&self.queries.update)
                    .bind(name)
                    .bind(age)
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(map_db_error)?;
                Ok::<_, RepositoryError>(())
            })
            .await
    }

    async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        let span = self
            .tracer
            .span(|| repository_span!("Delete", SYSTEM, self.table.as_str()));
        self.tracer
            .trace(span, async {
                sqlx::query(&self.queries.delete)
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(map_db_error)?;
                Ok::<_, RepositoryError>(())
            })
            .await
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let span = self
            .tracer
            .span(|| repository_span!("Count", SYSTEM, self.table.as_str()));
        self.tracer
            .trace(span, async {
                sqlx::query_scalar::<_, i64>(&self.queries.count)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_db_error)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_use_table_name() {
        let table = TableName::parse("people_test").unwrap();
        let queries = Queries::new(&table);
        assert!(
            queries
                .create_table
                .starts_with("CREATE TABLE IF NOT EXISTS people_test (")
        );
        assert!(queries.create_table.contains("name VARCHAR(50) NOT NULL"));
        assert_eq!(
            queries.select_one,
            "SELECT id, name, age FROM people_test WHERE id = $1"
        );
        assert_eq!(queries.count, "SELECT COUNT(*) FROM people_test");
    }

    #[test]
    fn test_non_database_errors_are_internal() {
        let err = map_db_error(sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind(), census_core::ErrorKind::Internal);
    }
}
