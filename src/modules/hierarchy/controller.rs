use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{Instrument, Span, instrument, warn};

use feedbackhub_core::AppError;
use feedbackhub_models::{EditSessionId, HierarchyTree};

use crate::metrics::{set_open_edit_sessions, track_edit_rejected};
use crate::modules::hierarchy::editor::{EditError, HierarchyEditor, SubjectInput};
use crate::modules::hierarchy::model::{
    BatchPath, CoursePath, DepartmentPath, EditSessionResponse, HierarchyResponse,
    InstitutionPath, NameDto, SaveReport, SessionPath, SubjectDto, SubjectPath, YearPath,
};
use crate::modules::hierarchy::service::HierarchyService;
use crate::modules::hierarchy::sessions::SessionError;
use crate::state::AppState;
use crate::validator::ValidatedJson;

fn rejected(err: SessionError, session_id: EditSessionId, operation: &'static str) -> AppError {
    if let SessionError::Edit(edit) = &err {
        track_edit_rejected(edit.kind());
        warn!(
            session.id = %session_id,
            operation,
            kind = edit.kind(),
            error = %edit,
            "Hierarchy edit rejected"
        );
    }
    err.into_app_error()
}

async fn apply_edit<F, R>(
    state: &AppState,
    session_id: EditSessionId,
    operation: &'static str,
    edit: F,
) -> Result<EditSessionResponse, AppError>
where
    F: FnOnce(&mut HierarchyEditor<'_>) -> Result<R, EditError>,
{
    let policy = &state.policy;
    state
        .sessions
        .edit(session_id, |tree| edit(&mut HierarchyEditor::new(tree, policy)))
        .await
        .map_err(|e| rejected(e, session_id, operation))
}

#[utoipa::path(
    get,
    path = "/api/institutions/{institution_id}/hierarchy",
    params(InstitutionPath),
    responses(
        (status = 200, description = "Stored hierarchy, or the built-in default", body = HierarchyResponse),
        (status = 502, description = "Document store unavailable", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn get_hierarchy(
    State(state): State<AppState>,
    Path(path): Path<InstitutionPath>,
) -> Result<Json<HierarchyResponse>, AppError> {
    let loaded = HierarchyService::load(state.store.as_ref(), &state.policy, path.institution_id).await?;

    Ok(Json(HierarchyResponse {
        institution_id: path.institution_id,
        source: loaded.source,
        tree: loaded.tree,
    }))
}

#[utoipa::path(
    put,
    path = "/api/institutions/{institution_id}/hierarchy",
    params(InstitutionPath),
    request_body = HierarchyTree,
    responses(
        (status = 200, description = "Hierarchy saved", body = SaveReport),
        (status = 422, description = "The tree breaks a naming rule", body = feedbackhub_core::ErrorResponse),
        (status = 502, description = "Document store rejected the save", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state, tree))]
pub async fn replace_hierarchy(
    State(state): State<AppState>,
    Path(path): Path<InstitutionPath>,
    Json(tree): Json<HierarchyTree>,
) -> Result<Json<SaveReport>, AppError> {
    let tree = HierarchyService::prepare_tree(&state.policy, tree).map_err(|violations| {
        let summary = violations
            .iter()
            .map(|v| format!("{}: {}", v.path, v.message))
            .collect::<Vec<_>>()
            .join("; ");
        let first_path = violations
            .first()
            .map(|v| v.path.clone())
            .unwrap_or_default();

        track_edit_rejected("validation");
        AppError::unprocessable(anyhow!("{}", summary)).with_field(first_path)
    })?;

    let report = HierarchyService::save(&state.store, path.institution_id, &tree).await?;
    Ok(Json(report))
}

#[utoipa::path(
    post,
    path = "/api/institutions/{institution_id}/hierarchy/sessions",
    params(InstitutionPath),
    responses(
        (status = 201, description = "Edit session opened", body = EditSessionResponse),
        (status = 502, description = "Document store unavailable", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn open_session(
    State(state): State<AppState>,
    Path(path): Path<InstitutionPath>,
) -> Result<(StatusCode, Json<EditSessionResponse>), AppError> {
    let loaded = HierarchyService::load(state.store.as_ref(), &state.policy, path.institution_id).await?;
    let session = state.sessions.open(path.institution_id, loaded).await;
    set_open_edit_sessions(state.sessions.len().await);

    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    get,
    path = "/api/hierarchy/sessions/{session_id}",
    params(SessionPath),
    responses(
        (status = 200, description = "Current state of the edit session", body = EditSessionResponse),
        (status = 404, description = "Edit session not found", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    Path(path): Path<SessionPath>,
) -> Result<Json<EditSessionResponse>, AppError> {
    state
        .sessions
        .get(path.session_id)
        .await
        .map(Json)
        .map_err(SessionError::into_app_error)
}

#[utoipa::path(
    delete,
    path = "/api/hierarchy/sessions/{session_id}",
    params(SessionPath),
    responses(
        (status = 204, description = "Edit session discarded"),
        (status = 404, description = "Edit session not found", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn close_session(
    State(state): State<AppState>,
    Path(path): Path<SessionPath>,
) -> Result<StatusCode, AppError> {
    state
        .sessions
        .close(path.session_id)
        .await
        .map_err(SessionError::into_app_error)?;
    set_open_edit_sessions(state.sessions.len().await);

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/hierarchy/sessions/{session_id}/save",
    params(SessionPath),
    responses(
        (status = 200, description = "Hierarchy saved", body = SaveReport),
        (status = 404, description = "Edit session not found", body = feedbackhub_core::ErrorResponse),
        (status = 409, description = "A save is already in progress", body = feedbackhub_core::ErrorResponse),
        (status = 502, description = "Document store rejected the save", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn save_session(
    State(state): State<AppState>,
    Path(path): Path<SessionPath>,
) -> Result<Json<SaveReport>, AppError> {
    let (institution_id, tree) = state
        .sessions
        .begin_save(path.session_id)
        .await
        .map_err(SessionError::into_app_error)?;

    // Runs detached so the outcome is recorded even if the client goes away.
    let store = Arc::clone(&state.store);
    let sessions = state.sessions.clone();
    let session_id = path.session_id;
    let task = tokio::spawn(
        async move {
            let outcome = HierarchyService::save(&store, institution_id, &tree).await;
            sessions.finish_save(session_id, &outcome).await;
            outcome
        }
        .instrument(Span::current()),
    );

    match task.await {
        Ok(outcome) => outcome.map(Json),
        Err(e) => {
            let failed = Err(AppError::internal(anyhow!("Save task failed: {}", e)));
            state.sessions.finish_save(session_id, &failed).await;
            failed.map(Json)
        }
    }
}

// Courses

#[utoipa::path(
    post,
    path = "/api/hierarchy/sessions/{session_id}/courses",
    params(SessionPath),
    request_body = NameDto,
    responses(
        (status = 201, description = "Course added", body = EditSessionResponse),
        (status = 404, description = "Edit session not found", body = feedbackhub_core::ErrorResponse),
        (status = 422, description = "Invalid or duplicate course name", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn add_course(
    State(state): State<AppState>,
    Path(path): Path<SessionPath>,
    ValidatedJson(dto): ValidatedJson<NameDto>,
) -> Result<(StatusCode, Json<EditSessionResponse>), AppError> {
    let session = apply_edit(&state, path.session_id, "add_course", |editor| {
        editor.add_course(&dto.name)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    put,
    path = "/api/hierarchy/sessions/{session_id}/courses/{course}",
    params(CoursePath),
    request_body = NameDto,
    responses(
        (status = 200, description = "Course renamed", body = EditSessionResponse),
        (status = 404, description = "Session or course not found", body = feedbackhub_core::ErrorResponse),
        (status = 422, description = "Invalid or duplicate course name", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn edit_course(
    State(state): State<AppState>,
    Path(path): Path<CoursePath>,
    ValidatedJson(dto): ValidatedJson<NameDto>,
) -> Result<Json<EditSessionResponse>, AppError> {
    apply_edit(&state, path.session_id, "edit_course", |editor| {
        editor.edit_course(path.course, &dto.name)
    })
    .await
    .map(Json)
}

#[utoipa::path(
    delete,
    path = "/api/hierarchy/sessions/{session_id}/courses/{course}",
    params(CoursePath),
    responses(
        (status = 200, description = "Course and everything beneath it removed", body = EditSessionResponse),
        (status = 404, description = "Session or course not found", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn delete_course(
    State(state): State<AppState>,
    Path(path): Path<CoursePath>,
) -> Result<Json<EditSessionResponse>, AppError> {
    apply_edit(&state, path.session_id, "delete_course", |editor| {
        editor.delete_course(path.course)
    })
    .await
    .map(Json)
}

// Years

#[utoipa::path(
    post,
    path = "/api/hierarchy/sessions/{session_id}/courses/{course}/years",
    params(CoursePath),
    request_body = NameDto,
    responses(
        (status = 201, description = "Year added", body = EditSessionResponse),
        (status = 404, description = "Session or course not found", body = feedbackhub_core::ErrorResponse),
        (status = 422, description = "Year not allowed or duplicate", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn add_year(
    State(state): State<AppState>,
    Path(path): Path<CoursePath>,
    ValidatedJson(dto): ValidatedJson<NameDto>,
) -> Result<(StatusCode, Json<EditSessionResponse>), AppError> {
    let session = apply_edit(&state, path.session_id, "add_year", |editor| {
        editor.add_year(path.course, &dto.name)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    put,
    path = "/api/hierarchy/sessions/{session_id}/courses/{course}/years/{year}",
    params(YearPath),
    request_body = NameDto,
    responses(
        (status = 200, description = "Year renamed", body = EditSessionResponse),
        (status = 404, description = "Session, course or year not found", body = feedbackhub_core::ErrorResponse),
        (status = 422, description = "Year not allowed or duplicate", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn edit_year(
    State(state): State<AppState>,
    Path(path): Path<YearPath>,
    ValidatedJson(dto): ValidatedJson<NameDto>,
) -> Result<Json<EditSessionResponse>, AppError> {
    apply_edit(&state, path.session_id, "edit_year", |editor| {
        editor.edit_year(path.course, path.year, &dto.name)
    })
    .await
    .map(Json)
}

#[utoipa::path(
    delete,
    path = "/api/hierarchy/sessions/{session_id}/courses/{course}/years/{year}",
    params(YearPath),
    responses(
        (status = 200, description = "Year removed", body = EditSessionResponse),
        (status = 404, description = "Session, course or year not found", body = feedbackhub_core::ErrorResponse),
        (status = 409, description = "Year still has departments", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn delete_year(
    State(state): State<AppState>,
    Path(path): Path<YearPath>,
) -> Result<Json<EditSessionResponse>, AppError> {
    apply_edit(&state, path.session_id, "delete_year", |editor| {
        editor.delete_year(path.course, path.year)
    })
    .await
    .map(Json)
}

// Departments

#[utoipa::path(
    post,
    path = "/api/hierarchy/sessions/{session_id}/courses/{course}/years/{year}/departments",
    params(YearPath),
    request_body = NameDto,
    responses(
        (status = 201, description = "Department added", body = EditSessionResponse),
        (status = 404, description = "Session, course or year not found", body = feedbackhub_core::ErrorResponse),
        (status = 422, description = "Invalid or duplicate department name", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn add_department(
    State(state): State<AppState>,
    Path(path): Path<YearPath>,
    ValidatedJson(dto): ValidatedJson<NameDto>,
) -> Result<(StatusCode, Json<EditSessionResponse>), AppError> {
    let session = apply_edit(&state, path.session_id, "add_department", |editor| {
        editor.add_department(path.course, path.year, &dto.name)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    put,
    path = "/api/hierarchy/sessions/{session_id}/courses/{course}/years/{year}/departments/{department}",
    params(DepartmentPath),
    request_body = NameDto,
    responses(
        (status = 200, description = "Department renamed", body = EditSessionResponse),
        (status = 404, description = "Selection not found", body = feedbackhub_core::ErrorResponse),
        (status = 422, description = "Invalid or duplicate department name", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn edit_department(
    State(state): State<AppState>,
    Path(path): Path<DepartmentPath>,
    ValidatedJson(dto): ValidatedJson<NameDto>,
) -> Result<Json<EditSessionResponse>, AppError> {
    apply_edit(&state, path.session_id, "edit_department", |editor| {
        editor.edit_department(path.course, path.year, path.department, &dto.name)
    })
    .await
    .map(Json)
}

#[utoipa::path(
    delete,
    path = "/api/hierarchy/sessions/{session_id}/courses/{course}/years/{year}/departments/{department}",
    params(DepartmentPath),
    responses(
        (status = 200, description = "Department removed", body = EditSessionResponse),
        (status = 404, description = "Selection not found", body = feedbackhub_core::ErrorResponse),
        (status = 409, description = "Department still has subjects", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn delete_department(
    State(state): State<AppState>,
    Path(path): Path<DepartmentPath>,
) -> Result<Json<EditSessionResponse>, AppError> {
    apply_edit(&state, path.session_id, "delete_department", |editor| {
        editor.delete_department(path.course, path.year, path.department)
    })
    .await
    .map(Json)
}

// Subjects

#[utoipa::path(
    post,
    path = "/api/hierarchy/sessions/{session_id}/courses/{course}/years/{year}/departments/{department}/subjects",
    params(DepartmentPath),
    request_body = SubjectDto,
    responses(
        (status = 201, description = "Subject added with the default batches", body = EditSessionResponse),
        (status = 404, description = "Selection not found", body = feedbackhub_core::ErrorResponse),
        (status = 422, description = "Invalid subject name or code", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn add_subject(
    State(state): State<AppState>,
    Path(path): Path<DepartmentPath>,
    ValidatedJson(dto): ValidatedJson<SubjectDto>,
) -> Result<(StatusCode, Json<EditSessionResponse>), AppError> {
    let input = SubjectInput::from(dto);
    let session = apply_edit(&state, path.session_id, "add_subject", |editor| {
        editor.add_subject(path.course, path.year, path.department, &input)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    put,
    path = "/api/hierarchy/sessions/{session_id}/courses/{course}/years/{year}/departments/{department}/subjects/{subject}",
    params(SubjectPath),
    request_body = SubjectDto,
    responses(
        (status = 200, description = "Subject updated; batches are kept", body = EditSessionResponse),
        (status = 404, description = "Selection not found", body = feedbackhub_core::ErrorResponse),
        (status = 422, description = "Invalid subject name or code", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn edit_subject(
    State(state): State<AppState>,
    Path(path): Path<SubjectPath>,
    ValidatedJson(dto): ValidatedJson<SubjectDto>,
) -> Result<Json<EditSessionResponse>, AppError> {
    let input = SubjectInput::from(dto);
    apply_edit(&state, path.session_id, "edit_subject", |editor| {
        editor.edit_subject(path.course, path.year, path.department, path.subject, &input)
    })
    .await
    .map(Json)
}

#[utoipa::path(
    delete,
    path = "/api/hierarchy/sessions/{session_id}/courses/{course}/years/{year}/departments/{department}/subjects/{subject}",
    params(SubjectPath),
    responses(
        (status = 200, description = "Subject removed", body = EditSessionResponse),
        (status = 404, description = "Selection not found", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn delete_subject(
    State(state): State<AppState>,
    Path(path): Path<SubjectPath>,
) -> Result<Json<EditSessionResponse>, AppError> {
    apply_edit(&state, path.session_id, "delete_subject", |editor| {
        editor.delete_subject(path.course, path.year, path.department, path.subject)
    })
    .await
    .map(Json)
}

// Batches

#[utoipa::path(
    post,
    path = "/api/hierarchy/sessions/{session_id}/courses/{course}/years/{year}/departments/{department}/subjects/{subject}/batches",
    params(SubjectPath),
    request_body = NameDto,
    responses(
        (status = 201, description = "Batch added", body = EditSessionResponse),
        (status = 404, description = "Selection not found", body = feedbackhub_core::ErrorResponse),
        (status = 422, description = "Invalid or duplicate batch name", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn add_batch(
    State(state): State<AppState>,
    Path(path): Path<SubjectPath>,
    ValidatedJson(dto): ValidatedJson<NameDto>,
) -> Result<(StatusCode, Json<EditSessionResponse>), AppError> {
    let session = apply_edit(&state, path.session_id, "add_batch", |editor| {
        editor.add_batch(path.course, path.year, path.department, path.subject, &dto.name)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    put,
    path = "/api/hierarchy/sessions/{session_id}/courses/{course}/years/{year}/departments/{department}/subjects/{subject}/batches/{batch}",
    params(BatchPath),
    request_body = NameDto,
    responses(
        (status = 200, description = "Batch renamed", body = EditSessionResponse),
        (status = 404, description = "Selection not found", body = feedbackhub_core::ErrorResponse),
        (status = 422, description = "Invalid or duplicate batch name", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn edit_batch(
    State(state): State<AppState>,
    Path(path): Path<BatchPath>,
    ValidatedJson(dto): ValidatedJson<NameDto>,
) -> Result<Json<EditSessionResponse>, AppError> {
    apply_edit(&state, path.session_id, "edit_batch", |editor| {
        editor.edit_batch(
            path.course,
            path.year,
            path.department,
            path.subject,
            path.batch,
            &dto.name,
        )
    })
    .await
    .map(Json)
}

#[utoipa::path(
    delete,
    path = "/api/hierarchy/sessions/{session_id}/courses/{course}/years/{year}/departments/{department}/subjects/{subject}/batches/{batch}",
    params(BatchPath),
    responses(
        (status = 200, description = "Batch removed", body = EditSessionResponse),
        (status = 404, description = "Selection not found", body = feedbackhub_core::ErrorResponse)
    ),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn delete_batch(
    State(state): State<AppState>,
    Path(path): Path<BatchPath>,
) -> Result<Json<EditSessionResponse>, AppError> {
    apply_edit(&state, path.session_id, "delete_batch", |editor| {
        editor.delete_batch(path.course, path.year, path.department, path.subject, path.batch)
    })
    .await
    .map(Json)
}
