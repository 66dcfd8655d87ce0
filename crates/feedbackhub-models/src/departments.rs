//! Department directory models.
//!
//! Besides appearing in the hierarchy, every department an institution uses
//! has a flat directory record with its own identity and a generated code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::ids::{DepartmentId, InstitutionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DepartmentRecord {
    pub id: DepartmentId,
    pub institution_id: InstitutionId,
    pub name: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewDepartment {
    pub institution_id: InstitutionId,
    pub name: String,
    pub code: String,
}

impl NewDepartment {
    /// A directory entry for `name` with its derived code.
    pub fn for_name(institution_id: InstitutionId, name: &str) -> Self {
        let name = name.trim();
        Self {
            institution_id,
            name: name.to_string(),
            code: generate_department_code(name),
        }
    }
}

impl DepartmentRecord {
    /// Directory lookups ignore case and surrounding whitespace.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

/// Derive a department code from its name.
///
/// Lowercases, strips everything that is neither ASCII alphanumeric nor
/// whitespace, then joins the remaining words with hyphens. Codes are always
/// URL-safe ASCII.
pub fn generate_department_code(name: &str) -> String {
    let kept: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_department_code() {
        assert_eq!(generate_department_code("Finance"), "finance");
        assert_eq!(generate_department_code("Computer Science"), "computer-science");
        assert_eq!(
            generate_department_code("  Electronics & Telecom  "),
            "electronics-telecom"
        );
        assert_eq!(generate_department_code("AI_ML-Ops"), "aimlops");
    }

    #[test]
    fn test_department_code_is_ascii() {
        assert_eq!(generate_department_code("Génie Civil"), "gnie-civil");
        assert_eq!(generate_department_code("Økonomi 2"), "konomi-2");
        assert!(
            generate_department_code("Física Aplicada")
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        );
    }

    #[test]
    fn test_new_department_trims_name() {
        let institution_id = InstitutionId::from_u128(1);
        let dto = NewDepartment::for_name(institution_id, "  Human Resources ");
        assert_eq!(dto.name, "Human Resources");
        assert_eq!(dto.code, "human-resources");
    }

    #[test]
    fn test_matches_name_ignores_case() {
        let record = DepartmentRecord {
            id: DepartmentId::from_u128(2),
            institution_id: InstitutionId::from_u128(1),
            name: "Finance".into(),
            code: "finance".into(),
            created_at: Utc::now(),
        };
        assert!(record.matches_name(" finance"));
        assert!(!record.matches_name("Marketing"));
    }
}
