use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    add_batch, add_course, add_department, add_subject, add_year, close_session, delete_batch,
    delete_course, delete_department, delete_subject, delete_year, edit_batch, edit_course,
    edit_department, edit_subject, edit_year, get_hierarchy, get_session, open_session,
    replace_hierarchy, save_session,
};

/// Whole-tree routes, nested under `/institutions`.
pub fn init_institution_hierarchy_router() -> Router<AppState> {
    Router::new()
        .route(
            "/{institution_id}/hierarchy",
            get(get_hierarchy).put(replace_hierarchy),
        )
        .route("/{institution_id}/hierarchy/sessions", post(open_session))
}

/// Edit-session routes, nested under `/hierarchy/sessions`.
pub fn init_sessions_router() -> Router<AppState> {
    const COURSE: &str = "/{session_id}/courses/{course}";
    const YEAR: &str = "/{session_id}/courses/{course}/years/{year}";
    const DEPARTMENT: &str =
        "/{session_id}/courses/{course}/years/{year}/departments/{department}";
    const SUBJECT: &str =
        "/{session_id}/courses/{course}/years/{year}/departments/{department}/subjects/{subject}";

    Router::new()
        .route("/{session_id}", get(get_session).delete(close_session))
        .route("/{session_id}/save", post(save_session))
        .route("/{session_id}/courses", post(add_course))
        .route(COURSE, put(edit_course).delete(delete_course))
        .route(&format!("{COURSE}/years"), post(add_year))
        .route(YEAR, put(edit_year).delete(delete_year))
        .route(&format!("{YEAR}/departments"), post(add_department))
        .route(DEPARTMENT, put(edit_department).delete(delete_department))
        .route(&format!("{DEPARTMENT}/subjects"), post(add_subject))
        .route(SUBJECT, put(edit_subject).delete(delete_subject))
        .route(&format!("{SUBJECT}/batches"), post(add_batch))
        .route(
            &format!("{SUBJECT}/batches/{{batch}}"),
            put(edit_batch).delete(delete_batch),
        )
}
