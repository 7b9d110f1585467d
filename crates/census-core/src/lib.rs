//! # Census Core
//!
//! Error types shared by every layer of the Census person service.
//!
//! - [`errors::AppError`]: HTTP-facing error carrying a status code and an
//!   underlying cause, rendered as a JSON body.
//! - [`errors::RepositoryError`]: data-access failures tagged with an
//!   [`errors::ErrorKind`] so handlers can map each kind to its own status.
//!
//! # Example
//!
//! ```ignore
//! use census_core::{AppError, RepositoryError};
//!
//! let err: AppError = RepositoryError::not_found("person", 7).into();
//! assert_eq!(err.status, axum::http::StatusCode::NOT_FOUND);
//! ```

pub mod errors;

// Re-export commonly used types at crate root
pub use errors::{AppError, ErrorKind, RepositoryError};
