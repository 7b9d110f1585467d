use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Longest name the store accepts (`VARCHAR(50)`).
pub const MAX_NAME_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub age: i32,
}

/// Body of create and update requests. Any client-supplied `id` is ignored.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PersonPayload {
    #[validate(length(min = 1, max = 50, message = "name must be between 1 and 50 characters"))]
    pub name: String,
    #[validate(range(min = 0, message = "age must not be negative"))]
    pub age: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PersonMutationResponse {
    pub message: String,
    pub id: i32,
}

impl PersonMutationResponse {
    pub fn new(message: &str, id: i32) -> Self {
        Self {
            message: message.to_string(),
            id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CountResponse {
    pub user_count: i64,
}
