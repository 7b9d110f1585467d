use async_trait::async_trait;
use census_core::RepositoryError;

use super::model::Person;

/// Resource label used in not-found errors.
pub const RESOURCE: &str = "person";

/// Data access for persons.
///
/// Every operation runs inside the caller's request: the active handler span
/// becomes the parent of the operation's span, and dropping the returned
/// future abandons the operation.
#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// Inserts a person and returns the store-assigned id.
    async fn create(&self, name: &str, age: i32) -> Result<i32, RepositoryError>;

    /// All persons, ordered by id.
    async fn find_all(&self) -> Result<Vec<Person>, RepositoryError>;

    /// Fails with [`RepositoryError::NotFound`] when no row has `id`.
    async fn find_by_id(&self, id: i32) -> Result<Person, RepositoryError>;

    /// Overwrites name and age. A missing `id` is not an error.
    async fn update(&self, id: i32, name: &str, age: i32) -> Result<(), RepositoryError>;

    /// Removes the row. A missing `id` is not an error.
    async fn delete(&self, id: i32) -> Result<(), RepositoryError>;

    async fn count(&self) -> Result<i64, RepositoryError>;
}
