use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{list_departments, sync_departments};

/// Nested under `/institutions`.
pub fn init_departments_router() -> Router<AppState> {
    Router::new()
        .route("/{institution_id}/departments", get(list_departments))
        .route("/{institution_id}/departments/sync", post(sync_departments))
}
