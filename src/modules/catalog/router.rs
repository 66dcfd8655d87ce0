use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{list_batches, list_courses, list_departments, list_subjects, list_years};

/// Nested under `/institutions`.
pub fn init_catalog_router() -> Router<AppState> {
    Router::new()
        .route("/{institution_id}/catalog/courses", get(list_courses))
        .route(
            "/{institution_id}/catalog/courses/{course}/years",
            get(list_years),
        )
        .route(
            "/{institution_id}/catalog/courses/{course}/years/{year}/departments",
            get(list_departments),
        )
        .route(
            "/{institution_id}/catalog/courses/{course}/years/{year}/departments/{department}/subjects",
            get(list_subjects),
        )
        .route(
            "/{institution_id}/catalog/courses/{course}/years/{year}/departments/{department}/subjects/{subject}/batches",
            get(list_batches),
        )
}
