use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use feedbackhub_models::{EditSessionId, HierarchyTree, InstitutionId, SubjectType};

use super::editor::SubjectInput;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NameDto {
    #[validate(length(min = 1, max = 200, message = "name must not be empty"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubjectDto {
    #[validate(length(min = 1, max = 200, message = "name must not be empty"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub code: String,
    #[serde(rename = "type", default)]
    pub subject_type: SubjectType,
}

impl From<SubjectDto> for SubjectInput {
    fn from(dto: SubjectDto) -> Self {
        Self {
            name: dto.name,
            code: dto.code,
            subject_type: dto.subject_type,
        }
    }
}

/// Where a loaded tree came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HierarchySource {
    /// The institution's saved configuration.
    Stored { updated_at: Option<DateTime<Utc>> },
    /// A built-in seed, named after the institution code that selected it.
    Default { name: String },
}

impl HierarchySource {
    pub fn is_stored(&self) -> bool {
        matches!(self, HierarchySource::Stored { .. })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HierarchyResponse {
    pub institution_id: InstitutionId,
    pub source: HierarchySource,
    pub tree: HierarchyTree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    Saved,
    /// The configuration was stored but some departments could not be created.
    SavedWithWarnings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DepartmentFailure {
    pub name: String,
    pub error: String,
}

/// Result of reconciling the department directory with a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DepartmentSync {
    pub created: Vec<String>,
    pub failed: Vec<DepartmentFailure>,
    /// The directory could not be listed, so nothing was created.
    pub skipped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SaveReport {
    pub status: SaveStatus,
    pub course_count: usize,
    pub departments_created: Vec<String>,
    pub departments_failed: Vec<DepartmentFailure>,
    pub departments_skipped: bool,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SaveState {
    Idle,
    Saving,
    Saved,
    Failed,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EditSessionResponse {
    pub id: EditSessionId,
    pub institution_id: InstitutionId,
    pub source: HierarchySource,
    pub save_state: SaveState,
    pub last_save: Option<SaveReport>,
    pub last_error: Option<String>,
    pub opened_at: DateTime<Utc>,
    pub tree: HierarchyTree,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct InstitutionPath {
    #[param(value_type = String, format = "uuid")]
    pub institution_id: InstitutionId,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct SessionPath {
    #[param(value_type = String, format = "uuid")]
    pub session_id: EditSessionId,
}

/// Index path of a course inside an edit session.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct CoursePath {
    #[param(value_type = String, format = "uuid")]
    pub session_id: EditSessionId,
    pub course: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct YearPath {
    #[param(value_type = String, format = "uuid")]
    pub session_id: EditSessionId,
    pub course: usize,
    pub year: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct DepartmentPath {
    #[param(value_type = String, format = "uuid")]
    pub session_id: EditSessionId,
    pub course: usize,
    pub year: usize,
    pub department: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct SubjectPath {
    #[param(value_type = String, format = "uuid")]
    pub session_id: EditSessionId,
    pub course: usize,
    pub year: usize,
    pub department: usize,
    pub subject: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct BatchPath {
    #[param(value_type = String, format = "uuid")]
    pub session_id: EditSessionId,
    pub course: usize,
    pub year: usize,
    pub department: usize,
    pub subject: usize,
    pub batch: usize,
}
