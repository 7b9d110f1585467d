use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::anyhow;
use async_trait::async_trait;
use census_core::RepositoryError;
use census_db::TableName;

use crate::repository_span;
use crate::utils::tracing::Tracer;

use super::model::{MAX_NAME_LEN, Person};
use super::repository::{PersonRepository, RESOURCE};

const SYSTEM: &str = "memory";

#[derive(Debug)]
struct Store {
    next_id: i32,
    rows: BTreeMap<i32, Person>,
}

/// Process-local store with the same observable behaviour as the PostgreSQL
/// repository: ids start at 1 and are never reused.
pub struct InMemoryPersonRepository {
    store: Mutex<Store>,
    table: TableName,
    tracer: Tracer,
}

impl InMemoryPersonRepository {
    pub fn new(tracer: Tracer) -> Self {
        Self {
            store: Mutex::new(Store {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
            table: TableName::default(),
            tracer,
        }
    }

    fn store(&self) -> Result<MutexGuard<'_, Store>, RepositoryError> {
        self.store
            .lock()
            .map_err(|_| RepositoryError::internal(anyhow!("person store lock poisoned")))
    }

    fn check_name(name: &str) -> Result<(), RepositoryError> {
        if name.chars().count() > MAX_NAME_LEN {
            return Err(RepositoryError::Validation(format!(
                "name exceeds {} characters",
                MAX_NAME_LEN
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PersonRepository for InMemoryPersonRepository {
    async fn create(&self, name: &str, age: i32) -> Result<i32, RepositoryError> {
        let span = self
            .tracer
            .span(|| repository_span!("Create", SYSTEM, self.table.as_str()));
        self.tracer
            .trace(span, async {
                Self::check_name(name)?;
                let mut store = self.store()?;
                let id = store.next_id;
                store.next_id += 1;
                store.rows.insert(
                    id,
                    Person {
                        id,
                        name: name.to_string(),
                        age,
                    },
                );
                Ok::<_, RepositoryError>(id)
            })
            .await
    }

    async fn find_all(&self) -> Result<Vec<Person>, RepositoryError> {
        let span = self
            .tracer
            .span(|| repository_span!("FindAll", SYSTEM, self.table.as_str()));
        self.tracer
            .trace(span, async {
                Ok::<_, RepositoryError>(self.store()?.rows.values().cloned().collect())
            })
            .await
    }

    async fn find_by_id(&self, id: i32) -> Result<Person, RepositoryError> {
        let span = self
            .tracer
            .span(|| repository_span!("FindById", SYSTEM, self.table.as_str()));
        self.tracer
            .trace(span, async {
                self.store()?
                    .rows
                    .get(&id)
                    .cloned()
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
                Self::check_name(name)?;
                if let Some(person) = self.store()?.rows.get_mut(&id) {
                    person.name = name.to_string();
                    person.age = age;
                }
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
                self.store()?.rows.remove(&id);
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
                Ok::<_, RepositoryError>(self.store()?.rows.len() as i64)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::tracing::REPOSITORY_TRACER;
    use crate::utils::tracing::recording::SpanRecorder;

    fn repo() -> InMemoryPersonRepository {
        InMemoryPersonRepository::new(Tracer::noop())
    }

    #[tokio::test]
    async fn test_create_then_find_all() {
        let repo = repo();
        let id = repo.create("Alice", 30).await.unwrap();
        assert_eq!(id, 1);

        let persons = repo.find_all().await.unwrap();
        assert_eq!(
            persons,
            vec![Person {
                id: 1,
                name: "Alice".to_string(),
                age: 30
            }]
        );
    }

    #[tokio::test]
    async fn test_ids_are_not_reused() {
        let repo = repo();
        let first = repo.create("Alice", 30).await.unwrap();
        repo.delete(first).await.unwrap();
        let second = repo.create("Bob", 25).await.unwrap();
        assert_eq!(second, first + 1);
    }

    #[tokio::test]
    async fn test_find_by_id_missing_is_not_found() {
        let repo = repo();
        let err = repo.find_by_id(42).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_only_touches_target_row() {
        let repo = repo();
        let alice = repo.create("Alice", 30).await.unwrap();
        let bob = repo.create("Bob", 25).await.unwrap();

        repo.update(bob, "Robert", 26).await.unwrap();

        let bob_row = repo.find_by_id(bob).await.unwrap();
        assert_eq!((bob_row.id, bob_row.name.as_str(), bob_row.age), (bob, "Robert", 26));
        let alice_row = repo.find_by_id(alice).await.unwrap();
        assert_eq!((alice_row.name.as_str(), alice_row.age), ("Alice", 30));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_are_noops() {
        let repo = repo();
        repo.create("Alice", 30).await.unwrap();

        repo.update(99, "Ghost", 1).await.unwrap();
        repo.delete(99).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.find_all().await.unwrap()[0].name, "Alice");
    }

    #[tokio::test]
    async fn test_count_matches_find_all() {
        let repo = repo();
        for (name, age) in [("A", 1), ("B", 2), ("C", 3)] {
            repo.create(name, age).await.unwrap();
        }
        repo.delete(2).await.unwrap();
        repo.update(3, "C2", 4).await.unwrap();

        let all = repo.find_all().await.unwrap();
        assert_eq!(repo.count().await.unwrap(), all.len() as i64);
    }

    #[tokio::test]
    async fn test_overlong_name_is_validation_error() {
        let repo = repo();
        let err = repo.create(&"x".repeat(MAX_NAME_LEN + 1), 1).await.unwrap_err();
        assert_eq!(err.kind(), census_core::ErrorKind::Validation);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_operations_open_repository_spans() {
        let recorder = SpanRecorder::new();
        let repo = InMemoryPersonRepository::new(recorder.tracer());

        repo.create("Alice", 30).await.unwrap();
        let _ = repo.find_by_id(7).await;

        let create = recorder.find("Create").unwrap();
        assert_eq!(create.target, REPOSITORY_TRACER);
        assert_eq!(create.field("db.system"), Some("memory"));
        assert_eq!(create.field("db.operation"), Some("Create"));
        assert_eq!(create.field("otel.status_code"), Some("OK"));
        assert!(create.closed);

        let find = recorder.find("FindById").unwrap();
        assert_eq!(find.field("otel.status_code"), Some("ERROR"));
        assert_eq!(find.field("error.message"), Some("person 7 not found"));
        assert!(find.closed);
    }
}
