use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use feedbackhub_models::{InstitutionId, SubjectEntry, SubjectType};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct CatalogCoursePath {
    #[param(value_type = String, format = "uuid")]
    pub institution_id: InstitutionId,
    pub course: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct CatalogYearPath {
    #[param(value_type = String, format = "uuid")]
    pub institution_id: InstitutionId,
    pub course: String,
    pub year: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct CatalogDepartmentPath {
    #[param(value_type = String, format = "uuid")]
    pub institution_id: InstitutionId,
    pub course: String,
    pub year: String,
    pub department: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct CatalogSubjectPath {
    #[param(value_type = String, format = "uuid")]
    pub institution_id: InstitutionId,
    pub course: String,
    pub year: String,
    pub department: String,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CatalogSubject {
    pub name: String,
    pub code: String,
    #[serde(rename = "type")]
    pub subject_type: SubjectType,
    pub batches: Vec<String>,
}

impl CatalogSubject {
    pub fn from_entry(name: &str, entry: &SubjectEntry) -> Self {
        Self {
            name: name.to_string(),
            code: entry.code.clone(),
            subject_type: entry.subject_type,
            batches: entry.batches.clone(),
        }
    }
}
