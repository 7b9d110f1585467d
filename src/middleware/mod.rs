//! Middleware and extractors for request processing.
//!
//! - [`auth`]: bearer-token gate and the [`auth::AuthUser`] extractor
//! - [`request_meta`]: request attributes recorded on handler spans

pub mod auth;
pub mod request_meta;
