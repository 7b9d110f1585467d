use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    count_persons, create_person, delete_person, get_person, get_persons, update_person,
};

/// Person routes, mounted with full paths. The static `count` segment takes
/// precedence over `{id}`.
pub fn init_persons_router() -> Router<AppState> {
    Router::new()
        .route("/persons", get(get_persons).post(create_person))
        .route("/persons/", get(get_persons).post(create_person))
        .route("/persons/count", get(count_persons))
        .route(
            "/persons/{id}",
            get(get_person).put(update_person).delete(delete_person),
        )
}
