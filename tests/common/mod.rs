#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use census::census_auth::{Claims, create_access_token, encode_claims};
use census::census_config::JwtConfig;
use census::modules::persons::{InMemoryPersonRepository, PersonRepository};
use census::router::init_router;
use census::state::AppState;
use census::utils::tracing::recording::SpanRecorder;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-chars";
pub const TEST_HOST: &str = "census.test";

pub struct TestApp {
    pub router: Router,
    pub spans: SpanRecorder,
    pub token: String,
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig::with_secret(TEST_SECRET)
}

/// Router over an empty in-memory store with a recording tracer.
pub fn setup_test_app() -> TestApp {
    let spans = SpanRecorder::new();
    let repo = Arc::new(InMemoryPersonRepository::new(spans.tracer()));
    setup_test_app_with(repo, jwt_config(), spans)
}

pub fn setup_test_app_with(
    repo: Arc<dyn PersonRepository>,
    config: JwtConfig,
    spans: SpanRecorder,
) -> TestApp {
    let token = create_access_token("tester", &jwt_config()).unwrap();
    let state = AppState::new(repo, config, spans.tracer());
    TestApp {
        router: init_router(state),
        spans,
        token,
    }
}

pub fn now() -> usize {
    chrono::Utc::now().timestamp() as usize
}

/// Signs claims with the test secret, for expired and not-yet-valid tokens.
pub fn token_with(exp: usize, nbf: Option<usize>) -> String {
    let claims = Claims {
        sub: "tester".to_string(),
        exp,
        iat: now(),
        nbf,
    };
    encode_claims(&claims, &jwt_config()).unwrap()
}

pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, body)
}

/// Authenticated JSON request against `app`.
pub async fn call(
    app: &TestApp,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, TEST_HOST)
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token));
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    send_request(&app.router, request).await
}
