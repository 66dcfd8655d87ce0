//! Per-level name validators.
//!
//! Each validator takes the candidate name, the sibling nodes it must not
//! collide with and, when renaming, the index of the node being renamed. On
//! success it returns the trimmed name to store; on failure a [`FieldError`]
//! carrying a message fit to show next to the input.

use feedbackhub_config::HierarchyPolicy;
use feedbackhub_models::{Course, Department, HierarchyTree, Subject, Year};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

pub const COURSE_NAME_MIN: usize = 2;
pub const COURSE_NAME_MAX: usize = 50;
pub const DEPARTMENT_NAME_MIN: usize = 2;
pub const DEPARTMENT_NAME_MAX: usize = 50;
pub const SUBJECT_NAME_MIN: usize = 2;
pub const SUBJECT_NAME_MAX: usize = 100;
pub const SUBJECT_CODE_MAX: usize = 20;
pub const BATCH_NAME_MIN: usize = 1;
pub const BATCH_NAME_MAX: usize = 10;
pub const CUSTOM_YEAR_MAX: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A rule broken somewhere in a submitted tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TreeViolation {
    /// Slash-separated names from the course down to the offending node.
    pub path: String,
    pub field: String,
    pub message: String,
}

/// Anything with a sibling-unique name.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Course {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Year {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Department {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Subject {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for String {
    fn name(&self) -> &str {
        self
    }
}

#[derive(Clone, Copy)]
enum Case {
    Sensitive,
    Insensitive,
}

struct NameRule {
    field: &'static str,
    label: &'static str,
    min: usize,
    max: usize,
    extra_chars: &'static [char],
    allowed_description: &'static str,
}

const COURSE_RULE: NameRule = NameRule {
    field: "name",
    label: "Course name",
    min: COURSE_NAME_MIN,
    max: COURSE_NAME_MAX,
    extra_chars: &[' ', '-', '_'],
    allowed_description: "letters, numbers, spaces, hyphens and underscores",
};

const DEPARTMENT_RULE: NameRule = NameRule {
    field: "name",
    label: "Department name",
    min: DEPARTMENT_NAME_MIN,
    max: DEPARTMENT_NAME_MAX,
    extra_chars: &[' ', '-', '_', '&'],
    allowed_description: "letters, numbers, spaces, hyphens, underscores and ampersands",
};

const SUBJECT_RULE: NameRule = NameRule {
    field: "name",
    label: "Subject name",
    min: SUBJECT_NAME_MIN,
    max: SUBJECT_NAME_MAX,
    extra_chars: &[' ', '-', '_', '(', ')'],
    allowed_description: "letters, numbers, spaces, hyphens, underscores and parentheses",
};

const BATCH_RULE: NameRule = NameRule {
    field: "name",
    label: "Batch name",
    min: BATCH_NAME_MIN,
    max: BATCH_NAME_MAX,
    extra_chars: &[' ', '-', '_'],
    allowed_description: "letters, numbers, spaces, hyphens and underscores",
};

const CUSTOM_YEAR_RULE: NameRule = NameRule {
    field: "name",
    label: "Year",
    min: 1,
    max: CUSTOM_YEAR_MAX,
    extra_chars: &[' ', '-', '_'],
    allowed_description: "letters, numbers, spaces, hyphens and underscores",
};

impl NameRule {
    fn check<'a>(&self, raw: &'a str) -> Result<&'a str, FieldError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(FieldError::new(self.field, format!("{} is required", self.label)));
        }

        let length = name.chars().count();
        if length < self.min {
            return Err(FieldError::new(
                self.field,
                format!("{} must be at least {} characters", self.label, self.min),
            ));
        }
        if length > self.max {
            return Err(FieldError::new(
                self.field,
                format!("{} must be at most {} characters", self.label, self.max),
            ));
        }

        if !name
            .chars()
            .all(|c| c.is_alphanumeric() || self.extra_chars.contains(&c))
        {
            return Err(FieldError::new(
                self.field,
                format!("{} can only contain {}", self.label, self.allowed_description),
            ));
        }

        Ok(name)
    }
}

fn ensure_unique<T: Named>(
    name: &str,
    siblings: &[T],
    exclude: Option<usize>,
    case: Case,
    message: &str,
) -> Result<(), FieldError> {
    let clash = siblings
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != exclude)
        .any(|(_, sibling)| {
            let other = sibling.name().trim();
            match case {
                Case::Sensitive => other == name,
                Case::Insensitive => other.to_lowercase() == name.to_lowercase(),
            }
        });

    if clash {
        Err(FieldError::new("name", message))
    } else {
        Ok(())
    }
}

pub fn validate_course_name(
    policy: &HierarchyPolicy,
    name: &str,
    siblings: &[Course],
    exclude: Option<usize>,
) -> Result<String, FieldError> {
    let name = COURSE_RULE.check(name)?;

    if policy.is_reserved(name) {
        return Err(FieldError::new(
            "name",
            format!("\"{}\" is a reserved name and cannot be used for a course", name),
        ));
    }

    ensure_unique(
        name,
        siblings,
        exclude,
        Case::Insensitive,
        "A course with this name already exists",
    )?;
    Ok(name.to_string())
}

/// Year labels accepted when adding or renaming a year.
///
/// Only the policy's year values pass unless the policy allows custom labels.
pub fn validate_year_name(
    policy: &HierarchyPolicy,
    name: &str,
    siblings: &[Year],
    exclude: Option<usize>,
) -> Result<String, FieldError> {
    let name = if policy.allow_custom_years {
        CUSTOM_YEAR_RULE.check(name)?
    } else {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(FieldError::new("name", "Year is required"));
        }
        if !policy.is_allowed_year(trimmed) {
            return Err(FieldError::new(
                "name",
                format!("Year must be one of: {}", policy.year_values.join(", ")),
            ));
        }
        trimmed
    };

    ensure_unique(
        name,
        siblings,
        exclude,
        Case::Sensitive,
        "This year already exists in this course",
    )?;
    Ok(name.to_string())
}

/// Year labels accepted in a stored or submitted tree.
///
/// Besides the policy's year values this tolerates any well-formed legacy
/// label, so configurations saved before the year policy can be re-saved.
pub fn validate_stored_year_name(
    policy: &HierarchyPolicy,
    name: &str,
    siblings: &[Year],
    exclude: Option<usize>,
) -> Result<String, FieldError> {
    let name = if policy.is_allowed_year(name) {
        name.trim()
    } else {
        CUSTOM_YEAR_RULE.check(name)?
    };

    ensure_unique(
        name,
        siblings,
        exclude,
        Case::Sensitive,
        "This year already exists in this course",
    )?;
    Ok(name.to_string())
}

pub fn validate_department_name(
    name: &str,
    siblings: &[Department],
    exclude: Option<usize>,
) -> Result<String, FieldError> {
    let name = DEPARTMENT_RULE.check(name)?;
    ensure_unique(
        name,
        siblings,
        exclude,
        Case::Insensitive,
        "A department with this name already exists in this year",
    )?;
    Ok(name.to_string())
}

pub fn validate_subject_name(
    name: &str,
    siblings: &[Subject],
    exclude: Option<usize>,
) -> Result<String, FieldError> {
    let name = SUBJECT_RULE.check(name)?;
    ensure_unique(
        name,
        siblings,
        exclude,
        Case::Insensitive,
        "A subject with this name already exists in this department",
    )?;
    Ok(name.to_string())
}

/// Subject codes are free text; only their length is bounded.
pub fn validate_subject_code(code: &str) -> Result<String, FieldError> {
    let code = code.trim();
    if code.chars().count() > SUBJECT_CODE_MAX {
        return Err(FieldError::new(
            "code",
            format!("Subject code must be at most {} characters", SUBJECT_CODE_MAX),
        ));
    }
    Ok(code.to_string())
}

pub fn validate_batch_name(
    name: &str,
    siblings: &[String],
    exclude: Option<usize>,
) -> Result<String, FieldError> {
    let name = BATCH_RULE.check(name)?;
    ensure_unique(
        name,
        siblings,
        exclude,
        Case::Sensitive,
        "A batch with this name already exists for this subject",
    )?;
    Ok(name.to_string())
}

/// Trim every name and code in a submitted tree.
pub fn trim_tree(tree: &mut HierarchyTree) {
    for course in &mut tree.courses {
        course.name = course.name.trim().to_string();
        for year in &mut course.years {
            year.name = year.name.trim().to_string();
            for department in &mut year.departments {
                department.name = department.name.trim().to_string();
                for subject in &mut department.subjects {
                    subject.name = subject.name.trim().to_string();
                    subject.code = subject.code.trim().to_string();
                    for batch in &mut subject.batches {
                        *batch = batch.trim().to_string();
                    }
                }
            }
        }
    }
}

/// Check every node of a whole tree against the level rules.
///
/// Returns every violation found; an empty list means the tree may be saved.
pub fn validate_tree(policy: &HierarchyPolicy, tree: &HierarchyTree) -> Vec<TreeViolation> {
    let mut violations = Vec::new();
    let mut record = |path: String, result: Result<String, FieldError>| {
        if let Err(err) = result {
            violations.push(TreeViolation {
                path,
                field: err.field.to_string(),
                message: err.message,
            });
        }
    };

    for (ci, course) in tree.courses.iter().enumerate() {
        let course_path = course.name.clone();
        record(
            course_path.clone(),
            validate_course_name(policy, &course.name, &tree.courses, Some(ci)),
        );

        for (yi, year) in course.years.iter().enumerate() {
            let year_path = format!("{}/{}", course_path, year.name);
            record(
                year_path.clone(),
                validate_stored_year_name(policy, &year.name, &course.years, Some(yi)),
            );

            for (di, department) in year.departments.iter().enumerate() {
                let department_path = format!("{}/{}", year_path, department.name);
                record(
                    department_path.clone(),
                    validate_department_name(&department.name, &year.departments, Some(di)),
                );

                for (si, subject) in department.subjects.iter().enumerate() {
                    let subject_path = format!("{}/{}", department_path, subject.name);
                    record(
                        subject_path.clone(),
                        validate_subject_name(&subject.name, &department.subjects, Some(si)),
                    );
                    record(subject_path.clone(), validate_subject_code(&subject.code));

                    for (bi, batch) in subject.batches.iter().enumerate() {
                        record(
                            format!("{}/{}", subject_path, batch),
                            validate_batch_name(batch, &subject.batches, Some(bi)),
                        );
                    }
                }
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedbackhub_models::SubjectType;

    fn policy() -> HierarchyPolicy {
        HierarchyPolicy::default()
    }

    fn courses(names: &[&str]) -> Vec<Course> {
        names.iter().map(|n| Course::new(*n)).collect()
    }

    #[test]
    fn test_course_name_rules() {
        let p = policy();
        assert_eq!(
            validate_course_name(&p, "  B Tech  ", &[], None),
            Ok("B Tech".to_string())
        );
        assert_eq!(
            validate_course_name(&p, "   ", &[], None).unwrap_err().message,
            "Course name is required"
        );
        assert!(validate_course_name(&p, "A", &[], None).is_err());
        assert!(validate_course_name(&p, &"x".repeat(51), &[], None).is_err());
        assert!(validate_course_name(&p, &"x".repeat(50), &[], None).is_ok());
        assert!(validate_course_name(&p, "B.Tech", &[], None).is_err());
        assert!(validate_course_name(&p, "R&D", &[], None).is_err());
        assert!(validate_course_name(&p, "Post_Grad-2", &[], None).is_ok());
    }

    #[test]
    fn test_course_reserved_words() {
        let p = policy();
        for word in ["admin", "SYSTEM", "Test", "null", "undefined"] {
            let err = validate_course_name(&p, word, &[], None).unwrap_err();
            assert!(err.message.contains("reserved"), "{}", word);
        }
    }

    #[test]
    fn test_course_duplicates_are_case_insensitive() {
        let p = policy();
        let siblings = courses(&["Engineering", "AI"]);
        let err = validate_course_name(&p, "engineering", &siblings, None).unwrap_err();
        assert_eq!(err.message, "A course with this name already exists");

        // Renaming a course to a case variant of itself is allowed.
        assert!(validate_course_name(&p, "ENGINEERING", &siblings, Some(0)).is_ok());
        assert!(validate_course_name(&p, "ai", &siblings, Some(0)).is_err());
    }

    #[test]
    fn test_year_values_are_restricted() {
        let p = policy();
        assert_eq!(validate_year_name(&p, " 2 ", &[], None), Ok("2".to_string()));
        let err = validate_year_name(&p, "5", &[], None).unwrap_err();
        assert_eq!(err.message, "Year must be one of: 1, 2, 3, 4");
        assert!(validate_year_name(&p, "First", &[], None).is_err());

        let siblings = vec![Year::new("1")];
        assert!(validate_year_name(&p, "1", &siblings, None).is_err());
        assert!(validate_year_name(&p, "1", &siblings, Some(0)).is_ok());
    }

    #[test]
    fn test_custom_years_when_policy_allows() {
        let p = HierarchyPolicy {
            allow_custom_years: true,
            ..HierarchyPolicy::default()
        };
        assert_eq!(
            validate_year_name(&p, "Final Year", &[], None),
            Ok("Final Year".to_string())
        );
        assert!(validate_year_name(&p, "Year/1", &[], None).is_err());
    }

    #[test]
    fn test_stored_years_tolerate_legacy_labels() {
        let p = policy();
        assert!(validate_stored_year_name(&p, "First Year", &[], None).is_ok());
        assert!(validate_stored_year_name(&p, "3", &[], None).is_ok());
        assert!(validate_stored_year_name(&p, "Year #1", &[], None).is_err());
    }

    #[test]
    fn test_department_name_rules() {
        assert!(validate_department_name("Electronics & Telecom", &[], None).is_ok());
        assert!(validate_department_name("I", &[], None).is_err());
        assert!(validate_department_name("IT (Core)", &[], None).is_err());

        let siblings = vec![Department::new("Finance")];
        let err = validate_department_name("FINANCE", &siblings, None).unwrap_err();
        assert!(err.message.contains("already exists"));
    }

    #[test]
    fn test_subject_name_and_code_rules() {
        assert!(validate_subject_name("Operating Systems (Lab)", &[], None).is_ok());
        assert!(validate_subject_name(&"s".repeat(100), &[], None).is_ok());
        assert!(validate_subject_name(&"s".repeat(101), &[], None).is_err());
        assert!(validate_subject_name("C++", &[], None).is_err());

        let siblings = vec![Subject::new("Maths", "", SubjectType::Theory, vec![])];
        assert!(validate_subject_name("maths", &siblings, None).is_err());

        assert_eq!(validate_subject_code("  CS-101 "), Ok("CS-101".to_string()));
        assert_eq!(validate_subject_code(""), Ok(String::new()));
        assert_eq!(
            validate_subject_code(&"c".repeat(21)).unwrap_err().field,
            "code"
        );
    }

    #[test]
    fn test_batch_names_are_case_sensitive() {
        let siblings = vec!["A".to_string(), "B".to_string()];
        assert!(validate_batch_name("a", &siblings, None).is_ok());
        assert!(validate_batch_name("A", &siblings, None).is_err());
        assert!(validate_batch_name("Batch-2024", &siblings, None).is_ok());
        assert!(validate_batch_name("Batch-20245", &siblings, None).is_err());
        assert!(validate_batch_name("", &siblings, None).is_err());
    }

    #[test]
    fn test_validate_tree_reports_paths() {
        let tree = HierarchyTree::new(vec![
            Course::new("CS").with_years(vec![Year::new("1").with_departments(vec![
                Department::new("IT").with_subjects(vec![Subject::new(
                    "Networks",
                    "",
                    SubjectType::Theory,
                    vec!["A".into(), "A".into()],
                )]),
                Department::new("it"),
            ])]),
            Course::new("admin"),
        ]);

        let violations = validate_tree(&policy(), &tree);
        let paths: Vec<&str> = violations.iter().map(|v| v.path.as_str()).collect();

        assert!(paths.contains(&"CS/1/IT"));
        assert!(paths.contains(&"CS/1/it"));
        assert!(paths.contains(&"CS/1/IT/Networks/A"));
        assert!(paths.contains(&"admin"));
        assert_eq!(violations.len(), 5);
    }

    #[test]
    fn test_trim_tree() {
        let mut tree = HierarchyTree::new(vec![Course::new(" CS ").with_years(vec![Year::new(" 1")])]);
        trim_tree(&mut tree);
        assert_eq!(tree.courses[0].name, "CS");
        assert_eq!(tree.courses[0].years[0].name, "1");
    }
}
