use std::future::Future;

use anyhow::anyhow;
use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, State,
        rejection::{BytesRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use census_core::AppError;
use tracing::Span;
use validator::Validate;

use crate::handler_span;
use crate::middleware::request_meta::RequestMeta;
use crate::modules::persons::model::{
    CountResponse, Person, PersonMutationResponse, PersonPayload,
};
use crate::state::AppState;
use crate::utils::tracing::{Tracer, record_http_status};

/// Runs a handler body inside its span and stamps the span with the status
/// actually sent.
async fn respond<T, F>(tracer: &Tracer, span: Span, status: StatusCode, body: F) -> Response
where
    T: IntoResponse,
    F: Future<Output = Result<T, AppError>>,
{
    let response = match tracer.trace(span.clone(), body).await {
        Ok(body) => (status, body).into_response(),
        Err(err) => err.into_response(),
    };
    record_http_status(&span, response.status().as_u16());
    response
}

/// Extractor rejections are reported as JSON errors from inside the span.
fn path_param(path: &Result<Path<String>, PathRejection>) -> Result<&str, AppError> {
    match path {
        Ok(Path(raw)) => Ok(raw.as_str()),
        Err(rejection) => Err(AppError::new(
            rejection.status(),
            anyhow!(rejection.body_text()),
        )),
    }
}

fn read_body(body: &Result<Bytes, BytesRejection>) -> Result<&[u8], AppError> {
    match body {
        Ok(bytes) => Ok(&bytes[..]),
        Err(rejection) => Err(AppError::new(
            rejection.status(),
            anyhow!(rejection.body_text()),
        )),
    }
}

fn parse_id(raw: &str) -> Result<i32, AppError> {
    raw.parse::<i32>()
        .map_err(|_| AppError::bad_request(anyhow!("Invalid person id: {}", raw)))
}

/// Decodes the body as JSON whatever its `Content-Type`, trims the name, then
/// validates it.
fn parse_payload(body: &[u8]) -> Result<PersonPayload, AppError> {
    let mut payload: PersonPayload = serde_json::from_slice(body)
        .map_err(|e| AppError::bad_request(anyhow!("Invalid request body: {}", e)))?;
    payload.name = payload.name.trim().to_string();
    payload.validate()?;
    Ok(payload)
}

#[utoipa::path(
    get,
    path = "/persons/",
    responses(
        (status = 200, description = "All persons", body = Vec<Person>),
        (status = 401, description = "Unauthorized", body = crate::docs::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::docs::ErrorResponse)
    ),
    tag = "Persons",
    security(("bearer_auth" = []))
)]
pub async fn get_persons(State(state): State<AppState>, meta: RequestMeta) -> Response {
    let span = state.tracer.span(|| handler_span!("GetPerson", meta));
    respond(&state.tracer, span, StatusCode::OK, async {
        let persons = state.persons.find_all().await?;
        Ok::<_, AppError>(Json(persons))
    })
    .await
}

#[utoipa::path(
    get,
    path = "/persons/{id}",
    params(
        ("id" = i32, Path, description = "Person ID")
    ),
    responses(
        (status = 200, description = "Person details", body = Person),
        (status = 400, description = "Non-integer id", body = crate::docs::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::docs::ErrorResponse),
        (status = 404, description = "Person not found", body = crate::docs::ErrorResponse)
    ),
    tag = "Persons",
    security(("bearer_auth" = []))
)]
pub async fn get_person(
    State(state): State<AppState>,
    meta: RequestMeta,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    let span = state.tracer.span(|| handler_span!("GetPersonByID", meta));
    respond(&state.tracer, span, StatusCode::OK, async {
        let id = parse_id(path_param(&path)?)?;
        let person = state.persons.find_by_id(id).await?;
        Ok::<_, AppError>(Json(person))
    })
    .await
}

#[utoipa::path(
    post,
    path = "/persons/",
    request_body = PersonPayload,
    responses(
        (status = 201, description = "Person created", body = PersonMutationResponse),
        (status = 400, description = "Malformed or invalid body", body = crate::docs::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::docs::ErrorResponse)
    ),
    tag = "Persons",
    security(("bearer_auth" = []))
)]
pub async fn create_person(
    State(state): State<AppState>,
    meta: RequestMeta,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let span = state.tracer.span(|| handler_span!("CreatePerson", meta));
    respond(&state.tracer, span, StatusCode::CREATED, async {
        let payload = parse_payload(read_body(&body)?)?;
        let id = state.persons.create(&payload.name, payload.age).await?;
        Ok::<_, AppError>(Json(PersonMutationResponse::new("Person created", id)))
    })
    .await
}

#[utoipa::path(
    put,
    path = "/persons/{id}",
    params(
        ("id" = i32, Path, description = "Person ID")
    ),
    request_body = PersonPayload,
    responses(
        (status = 200, description = "Person updated, or no such person", body = PersonMutationResponse),
        (status = 400, description = "Malformed body or non-integer id", body = crate::docs::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::docs::ErrorResponse)
    ),
    tag = "Persons",
    security(("bearer_auth" = []))
)]
pub async fn update_person(
    State(state): State<AppState>,
    meta: RequestMeta,
    path: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let span = state.tracer.span(|| handler_span!("UpdatePerson", meta));
    respond(&state.tracer, span, StatusCode::OK, async {
        let id = parse_id(path_param(&path)?)?;
        let payload = parse_payload(read_body(&body)?)?;
        state.persons.update(id, &payload.name, payload.age).await?;
        Ok::<_, AppError>(Json(PersonMutationResponse::new("Person updated", id)))
    })
    .await
}

#[utoipa::path(
    delete,
    path = "/persons/{id}",
    params(
        ("id" = i32, Path, description = "Person ID")
    ),
    responses(
        (status = 200, description = "Person deleted, or no such person", body = PersonMutationResponse),
        (status = 400, description = "Non-integer id", body = crate::docs::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::docs::ErrorResponse)
    ),
    tag = "Persons",
    security(("bearer_auth" = []))
)]
pub async fn delete_person(
    State(state): State<AppState>,
    meta: RequestMeta,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    let span = state.tracer.span(|| handler_span!("DeletePerson", meta));
    respond(&state.tracer, span, StatusCode::OK, async {
        let id = parse_id(path_param(&path)?)?;
        state.persons.delete(id).await?;
        Ok::<_, AppError>(Json(PersonMutationResponse::new("Person deleted", id)))
    })
    .await
}

#[utoipa::path(
    get,
    path = "/persons/count",
    responses(
        (status = 200, description = "Number of persons", body = CountResponse),
        (status = 401, description = "Unauthorized", body = crate::docs::ErrorResponse)
    ),
    tag = "Persons",
    security(("bearer_auth" = []))
)]
pub async fn count_persons(State(state): State<AppState>, meta: RequestMeta) -> Response {
    let span = state.tracer.span(|| handler_span!("CountPerson", meta));
    respond(&state.tracer, span, StatusCode::OK, async {
        let user_count = state.persons.count().await?;
        Ok::<_, AppError>(Json(CountResponse { user_count }))
    })
    .await
}
