use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{Method, header, request::Parts},
};

/// Request attributes recorded on handler spans.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub method: Method,
    pub url: String,
    pub path: String,
    pub host: String,
}

impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .or_else(|| parts.uri.host())
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            method: parts.method.clone(),
            url: parts.uri.to_string(),
            path: parts.uri.path().to_string(),
            host,
        })
    }
}
