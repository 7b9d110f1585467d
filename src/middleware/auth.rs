//! Bearer-token gate for the person routes.
//!
//! The credential is taken from the first non-empty source, in order:
//!
//! 1. `Authorization: Bearer <token>` header
//! 2. `jwt` query parameter
//! 3. `jwt` cookie
//!
//! No match leaves an empty credential, which is rejected like any other bad
//! token. The handler never runs for a rejected request.

use axum::{
    extract::{FromRequestParts, Query, Request, State},
    http::{HeaderMap, Uri, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use census_auth::{AuthError, Claims, verify_token};
use census_core::AppError;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::state::AppState;

/// Name of both the query parameter and the cookie that may carry a token.
pub const TOKEN_PARAM: &str = "jwt";

/// Claims of the token that let the request through.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn subject(&self) -> &str {
        &self.0.sub
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    jwt: Option<String>,
}

fn non_empty(token: String) -> Option<String> {
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn token_from_header(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    non_empty(token.to_string())
}

fn token_from_query(uri: &Uri) -> Option<String> {
    let Query(query) = Query::<TokenQuery>::try_from_uri(uri).ok()?;
    query.jwt.and_then(non_empty)
}

fn token_from_cookie(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    jar.get(TOKEN_PARAM)
        .map(|cookie| cookie.value().to_string())
        .and_then(non_empty)
}

/// Returns the first credential found, or an empty string.
pub fn extract_token(headers: &HeaderMap, uri: &Uri) -> String {
    token_from_header(headers)
        .or_else(|| token_from_query(uri))
        .or_else(|| token_from_cookie(headers))
        .unwrap_or_default()
}

fn authenticate(headers: &HeaderMap, uri: &Uri, state: &AppState) -> Result<AuthUser, AppError> {
    let token = extract_token(headers, uri);
    verify_token(&token, &state.jwt_config)
        .map(AuthUser)
        .map_err(|err| {
            match &err {
                AuthError::MissingSecret => {
                    tracing::error!("JWT_SECRET is not set; rejecting authenticated request")
                }
                other => warn!(reason = %other, path = %uri.path(), "Rejected credential"),
            }
            AppError::from(err)
        })
}

/// Route layer that admits only requests carrying a valid token.
///
/// ```rust,ignore
/// let routes = init_persons_router()
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));
/// ```
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    match authenticate(req.headers(), req.uri(), &state) {
        Ok(auth_user) => {
            debug!(subject = %auth_user.subject(), path = %req.uri().path(), "Authenticated request");
            req.extensions_mut().insert(auth_user);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

/// Reuses the claims [`require_auth`] stored on the request, verifying the
/// token itself when the extractor is used on an ungated route.
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth_user) = parts.extensions.get::<AuthUser>() {
            return Ok(auth_user.clone());
        }
        authenticate(&parts.headers, &parts.uri, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    #[test]
    fn test_header_wins_over_query_and_cookie() {
        let headers = headers(&[
            (header::AUTHORIZATION, "Bearer from-header"),
            (header::COOKIE, "jwt=from-cookie"),
        ]);
        assert_eq!(
            extract_token(&headers, &uri("/persons/?jwt=from-query")),
            "from-header"
        );
    }

    #[test]
    fn test_query_wins_over_cookie() {
        let headers = headers(&[(header::COOKIE, "jwt=from-cookie")]);
        assert_eq!(
            extract_token(&headers, &uri("/persons/?jwt=from-query")),
            "from-query"
        );
    }

    #[test]
    fn test_cookie_is_last_resort() {
        let headers = headers(&[(header::COOKIE, "theme=dark; jwt=from-cookie")]);
        assert_eq!(extract_token(&headers, &uri("/persons/")), "from-cookie");
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        let headers = headers(&[(header::AUTHORIZATION, "bearer abc")]);
        assert_eq!(extract_token(&headers, &uri("/persons/")), "abc");
    }

    #[test]
    fn test_empty_sources_fall_through() {
        let headers = headers(&[
            (header::AUTHORIZATION, "Basic dXNlcjpwYXNz"),
            (header::COOKIE, "jwt=from-cookie"),
        ]);
        assert_eq!(extract_token(&headers, &uri("/persons/?jwt=")), "from-cookie");
    }

    #[test]
    fn test_no_credential_is_empty() {
        assert_eq!(extract_token(&HeaderMap::new(), &uri("/persons/count")), "");
    }

    fn state() -> AppState {
        use crate::modules::persons::InMemoryPersonRepository;
        use crate::utils::tracing::Tracer;
        use std::sync::Arc;

        AppState::new(
            Arc::new(InMemoryPersonRepository::new(Tracer::noop())),
            census_config::JwtConfig::with_secret("extractor-test-secret-at-least-32-chars"),
            Tracer::noop(),
        )
    }

    #[tokio::test]
    async fn test_extractor_reuses_gate_claims() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/persons/")
            .body(())
            .unwrap()
            .into_parts();
        parts.extensions.insert(AuthUser(Claims {
            sub: "gated".to_string(),
            exp: usize::MAX,
            iat: 0,
            nbf: None,
        }));

        let user = AuthUser::from_request_parts(&mut parts, &state()).await.unwrap();
        assert_eq!(user.subject(), "gated");
    }

    #[tokio::test]
    async fn test_extractor_verifies_token_without_gate() {
        let state = state();
        let token = census_auth::create_access_token("alice", &state.jwt_config).unwrap();
        let (mut parts, _) = axum::http::Request::builder()
            .uri(format!("/persons/?jwt={}", token))
            .body(())
            .unwrap()
            .into_parts();

        let user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.subject(), "alice");

        let (mut parts, _) = axum::http::Request::builder()
            .uri("/persons/")
            .body(())
            .unwrap()
            .into_parts();
        let err = AuthUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
    }
}
