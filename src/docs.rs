use serde::Serialize;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::modules::persons::model::{CountResponse, Person, PersonMutationResponse, PersonPayload};

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::persons::controller::get_persons,
        crate::modules::persons::controller::get_person,
        crate::modules::persons::controller::create_person,
        crate::modules::persons::controller::update_person,
        crate::modules::persons::controller::delete_person,
        crate::modules::persons::controller::count_persons,
    ),
    components(
        schemas(
            Person,
            PersonPayload,
            PersonMutationResponse,
            CountResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Persons", description = "Person CRUD endpoints")
    ),
    info(
        title = "Census API",
        version = "0.1.0",
        description = "Person records over HTTP, backed by PostgreSQL and gated by JWT bearer tokens.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_person_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/persons/"));
        assert!(paths.iter().any(|p| p.as_str() == "/persons/{id}"));
        assert!(paths.iter().any(|p| p.as_str() == "/persons/count"));
    }

    #[test]
    fn test_openapi_declares_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
