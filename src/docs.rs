use utoipa::OpenApi;

use feedbackhub_core::ErrorResponse;
use feedbackhub_models::{
    Course, Department, DepartmentRecord, HierarchyTree, Subject, SubjectType, Year,
};

use crate::modules::catalog::model::CatalogSubject;
use crate::modules::hierarchy::model::{
    DepartmentFailure, DepartmentSync, EditSessionResponse, HierarchyResponse, HierarchySource,
    NameDto, SaveReport, SaveState, SaveStatus, SubjectDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::hierarchy::controller::get_hierarchy,
        crate::modules::hierarchy::controller::replace_hierarchy,
        crate::modules::hierarchy::controller::open_session,
        crate::modules::hierarchy::controller::get_session,
        crate::modules::hierarchy::controller::close_session,
        crate::modules::hierarchy::controller::save_session,
        crate::modules::hierarchy::controller::add_course,
        crate::modules::hierarchy::controller::edit_course,
        crate::modules::hierarchy::controller::delete_course,
        crate::modules::hierarchy::controller::add_year,
        crate::modules::hierarchy::controller::edit_year,
        crate::modules::hierarchy::controller::delete_year,
        crate::modules::hierarchy::controller::add_department,
        crate::modules::hierarchy::controller::edit_department,
        crate::modules::hierarchy::controller::delete_department,
        crate::modules::hierarchy::controller::add_subject,
        crate::modules::hierarchy::controller::edit_subject,
        crate::modules::hierarchy::controller::delete_subject,
        crate::modules::hierarchy::controller::add_batch,
        crate::modules::hierarchy::controller::edit_batch,
        crate::modules::hierarchy::controller::delete_batch,
        crate::modules::catalog::controller::list_courses,
        crate::modules::catalog::controller::list_years,
        crate::modules::catalog::controller::list_departments,
        crate::modules::catalog::controller::list_subjects,
        crate::modules::catalog::controller::list_batches,
        crate::modules::departments::controller::list_departments,
        crate::modules::departments::controller::sync_departments,
    ),
    components(
        schemas(
            HierarchyTree,
            Course,
            Year,
            Department,
            Subject,
            SubjectType,
            HierarchyResponse,
            HierarchySource,
            EditSessionResponse,
            SaveReport,
            SaveStatus,
            SaveState,
            DepartmentSync,
            DepartmentFailure,
            NameDto,
            SubjectDto,
            CatalogSubject,
            DepartmentRecord,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Hierarchy", description = "Load, edit and save an institution's academic hierarchy"),
        (name = "Catalog", description = "Cascading lookups over the saved hierarchy"),
        (name = "Departments", description = "Institution-wide department directory")
    ),
    info(
        title = "Feedbackhub API",
        version = "0.1.0",
        description = "Academic hierarchy administration for the Feedbackhub faculty feedback platform",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;
