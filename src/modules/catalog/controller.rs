use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use feedbackhub_core::AppError;

use crate::modules::catalog::model::{
    CatalogCoursePath, CatalogDepartmentPath, CatalogSubject, CatalogSubjectPath, CatalogYearPath,
};
use crate::modules::catalog::service::CatalogService;
use crate::modules::hierarchy::model::InstitutionPath;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/institutions/{institution_id}/catalog/courses",
    params(InstitutionPath),
    responses(
        (status = 200, description = "Course names in display order", body = Vec<String>)
    ),
    tag = "Catalog"
)]
#[instrument(skip(state))]
pub async fn list_courses(
    State(state): State<AppState>,
    Path(path): Path<InstitutionPath>,
) -> Result<Json<Vec<String>>, AppError> {
    let config = CatalogService::config(state.store.as_ref(), &state.policy, path.institution_id).await?;
    Ok(Json(
        config
            .course_index
            .course_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/institutions/{institution_id}/catalog/courses/{course}/years",
    params(CatalogCoursePath),
    responses(
        (status = 200, description = "Years of the course; empty for an unknown course", body = Vec<String>)
    ),
    tag = "Catalog"
)]
#[instrument(skip(state))]
pub async fn list_years(
    State(state): State<AppState>,
    Path(path): Path<CatalogCoursePath>,
) -> Result<Json<Vec<String>>, AppError> {
    let config = CatalogService::config(state.store.as_ref(), &state.policy, path.institution_id).await?;
    Ok(Json(config.course_index.years(&path.course).to_vec()))
}

#[utoipa::path(
    get,
    path = "/api/institutions/{institution_id}/catalog/courses/{course}/years/{year}/departments",
    params(CatalogYearPath),
    responses(
        (status = 200, description = "Departments of the course year", body = Vec<String>)
    ),
    tag = "Catalog"
)]
#[instrument(skip(state))]
pub async fn list_departments(
    State(state): State<AppState>,
    Path(path): Path<CatalogYearPath>,
) -> Result<Json<Vec<String>>, AppError> {
    let config = CatalogService::config(state.store.as_ref(), &state.policy, path.institution_id).await?;
    Ok(Json(
        config
            .course_index
            .departments(&path.course, &path.year)
            .to_vec(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/institutions/{institution_id}/catalog/courses/{course}/years/{year}/departments/{department}/subjects",
    params(CatalogDepartmentPath),
    responses(
        (status = 200, description = "Subjects of the department, ordered by name", body = Vec<CatalogSubject>)
    ),
    tag = "Catalog"
)]
#[instrument(skip(state))]
pub async fn list_subjects(
    State(state): State<AppState>,
    Path(path): Path<CatalogDepartmentPath>,
) -> Result<Json<Vec<CatalogSubject>>, AppError> {
    let config = CatalogService::config(state.store.as_ref(), &state.policy, path.institution_id).await?;
    Ok(Json(
        config
            .subject_table
            .subjects(&path.course, &path.year, &path.department)
            .into_iter()
            .map(|(name, entry)| CatalogSubject::from_entry(name, entry))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/institutions/{institution_id}/catalog/courses/{course}/years/{year}/departments/{department}/subjects/{subject}/batches",
    params(CatalogSubjectPath),
    responses(
        (status = 200, description = "Batches of the subject", body = Vec<String>)
    ),
    tag = "Catalog"
)]
#[instrument(skip(state))]
pub async fn list_batches(
    State(state): State<AppState>,
    Path(path): Path<CatalogSubjectPath>,
) -> Result<Json<Vec<String>>, AppError> {
    let config = CatalogService::config(state.store.as_ref(), &state.policy, path.institution_id).await?;
    Ok(Json(
        config
            .subject_table
            .batches(&path.course, &path.year, &path.department, &path.subject)
            .to_vec(),
    ))
}
