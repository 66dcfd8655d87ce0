use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use feedbackhub_core::AppError;
use feedbackhub_models::DepartmentRecord;

use crate::modules::departments::service::DepartmentService;
use crate::modules::hierarchy::model::{DepartmentSync, InstitutionPath};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/institutions/{institution_id}/departments",
    params(InstitutionPath),
    responses(
        (status = 200, description = "Department directory, ordered by name", body = Vec<DepartmentRecord>),
        (status = 502, description = "Document store unavailable", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Departments"
)]
#[instrument(skip(state))]
pub async fn list_departments(
    State(state): State<AppState>,
    Path(path): Path<InstitutionPath>,
) -> Result<Json<Vec<DepartmentRecord>>, AppError> {
    let departments = DepartmentService::list(state.store.as_ref(), path.institution_id).await?;
    Ok(Json(departments))
}

#[utoipa::path(
    post,
    path = "/api/institutions/{institution_id}/departments/sync",
    params(InstitutionPath),
    responses(
        (status = 200, description = "Missing departments created", body = DepartmentSync),
        (status = 404, description = "No saved hierarchy", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Departments"
)]
#[instrument(skip(state))]
pub async fn sync_departments(
    State(state): State<AppState>,
    Path(path): Path<InstitutionPath>,
) -> Result<Json<DepartmentSync>, AppError> {
    let sync = DepartmentService::resync(&state.store, &state.policy, path.institution_id).await?;
    Ok(Json(sync))
}
