//! Structural edits on a hierarchy tree.
//!
//! Nodes are addressed by their index path from the root. Every operation is
//! all-or-nothing: when it returns an error the tree is unchanged.

use feedbackhub_config::HierarchyPolicy;
use feedbackhub_core::AppError;
use feedbackhub_models::{Course, Department, HierarchyTree, Subject, SubjectType, Year};
use thiserror::Error;

use super::validation::{
    self, FieldError, validate_batch_name, validate_course_name, validate_department_name,
    validate_subject_code, validate_subject_name,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("{0}")]
    Validation(#[from] FieldError),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("{0}")]
    HasChildren(String),
}

impl EditError {
    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            EditError::Validation(_) => "validation",
            EditError::InvalidSelection(_) => "invalid_selection",
            EditError::HasChildren(_) => "has_children",
        }
    }

    pub fn into_app_error(self) -> AppError {
        match self {
            EditError::Validation(err) => {
                let field = err.field;
                AppError::unprocessable(err).with_field(field)
            }
            err @ EditError::InvalidSelection(_) => AppError::not_found(err),
            err @ EditError::HasChildren(_) => AppError::conflict(err),
        }
    }
}

/// Fields of a subject as entered by a user.
#[derive(Debug, Clone)]
pub struct SubjectInput {
    pub name: String,
    pub code: String,
    pub subject_type: SubjectType,
}

pub struct HierarchyEditor<'a> {
    tree: &'a mut HierarchyTree,
    policy: &'a HierarchyPolicy,
}

fn missing(what: &str, index: usize) -> EditError {
    EditError::InvalidSelection(format!("{} {} does not exist", what, index))
}

impl<'a> HierarchyEditor<'a> {
    pub fn new(tree: &'a mut HierarchyTree, policy: &'a HierarchyPolicy) -> Self {
        Self { tree, policy }
    }

    fn course_mut(&mut self, course: usize) -> Result<&mut Course, EditError> {
        self.tree
            .courses
            .get_mut(course)
            .ok_or_else(|| missing("course", course))
    }

    fn year_mut(&mut self, course: usize, year: usize) -> Result<&mut Year, EditError> {
        self.course_mut(course)?
            .years
            .get_mut(year)
            .ok_or_else(|| missing("year", year))
    }

    fn department_mut(
        &mut self,
        course: usize,
        year: usize,
        department: usize,
    ) -> Result<&mut Department, EditError> {
        self.year_mut(course, year)?
            .departments
            .get_mut(department)
            .ok_or_else(|| missing("department", department))
    }

    fn subject_mut(
        &mut self,
        course: usize,
        year: usize,
        department: usize,
        subject: usize,
    ) -> Result<&mut Subject, EditError> {
        self.department_mut(course, year, department)?
            .subjects
            .get_mut(subject)
            .ok_or_else(|| missing("subject", subject))
    }

    // Courses

    pub fn add_course(&mut self, name: &str) -> Result<usize, EditError> {
        let name = validate_course_name(self.policy, name, &self.tree.courses, None)?;
        self.tree.courses.push(Course::new(name));
        Ok(self.tree.courses.len() - 1)
    }

    pub fn edit_course(&mut self, course: usize, name: &str) -> Result<(), EditError> {
        if course >= self.tree.courses.len() {
            return Err(missing("course", course));
        }
        let name = validate_course_name(self.policy, name, &self.tree.courses, Some(course))?;
        self.tree.courses[course].name = name;
        Ok(())
    }

    /// Removes the course with everything beneath it.
    pub fn delete_course(&mut self, course: usize) -> Result<Course, EditError> {
        if course >= self.tree.courses.len() {
            return Err(missing("course", course));
        }
        Ok(self.tree.courses.remove(course))
    }

    // Years

    pub fn add_year(&mut self, course: usize, name: &str) -> Result<usize, EditError> {
        let policy = self.policy;
        let target = self.course_mut(course)?;
        let name = validation::validate_year_name(policy, name, &target.years, None)?;
        target.years.push(Year::new(name));
        Ok(target.years.len() - 1)
    }

    pub fn edit_year(&mut self, course: usize, year: usize, name: &str) -> Result<(), EditError> {
        let policy = self.policy;
        let target = self.course_mut(course)?;
        if year >= target.years.len() {
            return Err(missing("year", year));
        }
        let name = validation::validate_year_name(policy, name, &target.years, Some(year))?;
        target.years[year].name = name;
        Ok(())
    }

    pub fn delete_year(&mut self, course: usize, year: usize) -> Result<Year, EditError> {
        let target = self.course_mut(course)?;
        let existing = target.years.get(year).ok_or_else(|| missing("year", year))?;
        if !existing.departments.is_empty() {
            return Err(EditError::HasChildren(format!(
                "Cannot delete year \"{}\" because it has existing departments",
                existing.name
            )));
        }
        Ok(target.years.remove(year))
    }

    // Departments

    pub fn add_department(
        &mut self,
        course: usize,
        year: usize,
        name: &str,
    ) -> Result<usize, EditError> {
        let target = self.year_mut(course, year)?;
        let name = validate_department_name(name, &target.departments, None)?;
        target.departments.push(Department::new(name));
        Ok(target.departments.len() - 1)
    }

    pub fn edit_department(
        &mut self,
        course: usize,
        year: usize,
        department: usize,
        name: &str,
    ) -> Result<(), EditError> {
        let target = self.year_mut(course, year)?;
        if department >= target.departments.len() {
            return Err(missing("department", department));
        }
        let name = validate_department_name(name, &target.departments, Some(department))?;
        target.departments[department].name = name;
        Ok(())
    }

    pub fn delete_department(
        &mut self,
        course: usize,
        year: usize,
        department: usize,
    ) -> Result<Department, EditError> {
        let target = self.year_mut(course, year)?;
        let existing = target
            .departments
            .get(department)
            .ok_or_else(|| missing("department", department))?;
        if !existing.subjects.is_empty() {
            return Err(EditError::HasChildren(format!(
                "Cannot delete department \"{}\" because it has existing subjects",
                existing.name
            )));
        }
        Ok(target.departments.remove(department))
    }

    // Subjects

    /// New subjects start with the policy's default batches.
    pub fn add_subject(
        &mut self,
        course: usize,
        year: usize,
        department: usize,
        input: &SubjectInput,
    ) -> Result<usize, EditError> {
        let batches = self.policy.default_batches.clone();
        let target = self.department_mut(course, year, department)?;
        let name = validate_subject_name(&input.name, &target.subjects, None)?;
        let code = validate_subject_code(&input.code)?;
        target
            .subjects
            .push(Subject::new(name, code, input.subject_type, batches));
        Ok(target.subjects.len() - 1)
    }

    /// Replaces name, code and type; batches are kept.
    pub fn edit_subject(
        &mut self,
        course: usize,
        year: usize,
        department: usize,
        subject: usize,
        input: &SubjectInput,
    ) -> Result<(), EditError> {
        let target = self.department_mut(course, year, department)?;
        if subject >= target.subjects.len() {
            return Err(missing("subject", subject));
        }
        let name = validate_subject_name(&input.name, &target.subjects, Some(subject))?;
        let code = validate_subject_code(&input.code)?;

        let existing = &mut target.subjects[subject];
        existing.name = name;
        existing.code = code;
        existing.subject_type = input.subject_type;
        Ok(())
    }

    pub fn delete_subject(
        &mut self,
        course: usize,
        year: usize,
        department: usize,
        subject: usize,
    ) -> Result<Subject, EditError> {
        let target = self.department_mut(course, year, department)?;
        if subject >= target.subjects.len() {
            return Err(missing("subject", subject));
        }
        Ok(target.subjects.remove(subject))
    }

    // Batches

    pub fn add_batch(
        &mut self,
        course: usize,
        year: usize,
        department: usize,
        subject: usize,
        name: &str,
    ) -> Result<usize, EditError> {
        let target = self.subject_mut(course, year, department, subject)?;
        let name = validate_batch_name(name, &target.batches, None)?;
        target.batches.push(name);
        Ok(target.batches.len() - 1)
    }

    pub fn edit_batch(
        &mut self,
        course: usize,
        year: usize,
        department: usize,
        subject: usize,
        batch: usize,
        name: &str,
    ) -> Result<(), EditError> {
        let target = self.subject_mut(course, year, department, subject)?;
        if batch >= target.batches.len() {
            return Err(missing("batch", batch));
        }
        let name = validate_batch_name(name, &target.batches, Some(batch))?;
        target.batches[batch] = name;
        Ok(())
    }

    pub fn delete_batch(
        &mut self,
        course: usize,
        year: usize,
        department: usize,
        subject: usize,
        batch: usize,
    ) -> Result<String, EditError> {
        let target = self.subject_mut(course, year, department, subject)?;
        if batch >= target.batches.len() {
            return Err(missing("batch", batch));
        }
        Ok(target.batches.remove(batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> HierarchyTree {
        HierarchyTree::new(vec![Course::new("CS").with_years(vec![
            Year::new("1").with_departments(vec![Department::new("IT").with_subjects(vec![
                Subject::new("Networks", "CS301", SubjectType::Theory, vec!["A".into(), "B".into()]),
            ])]),
            Year::new("2"),
        ])])
    }

    fn input(name: &str, code: &str) -> SubjectInput {
        SubjectInput {
            name: name.to_string(),
            code: code.to_string(),
            subject_type: SubjectType::Practical,
        }
    }

    #[test]
    fn test_add_course_rejects_case_insensitive_duplicate() {
        let policy = HierarchyPolicy::default();
        let mut tree = HierarchyTree::new(vec![Course::new("Engineering")]);
        let before = tree.clone();

        let err = HierarchyEditor::new(&mut tree, &policy)
            .add_course("engineering")
            .unwrap_err();

        assert!(matches!(err, EditError::Validation(_)));
        assert!(err.to_string().contains("already exists"));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_add_course_trims_and_appends() {
        let policy = HierarchyPolicy::default();
        let mut tree = sample_tree();
        let index = HierarchyEditor::new(&mut tree, &policy)
            .add_course("  MBA ")
            .unwrap();
        assert_eq!(index, 1);
        assert_eq!(tree.courses[1].name, "MBA");
        assert!(tree.courses[1].years.is_empty());
    }

    #[test]
    fn test_edit_course_allows_own_name() {
        let policy = HierarchyPolicy::default();
        let mut tree = sample_tree();
        HierarchyEditor::new(&mut tree, &policy)
            .edit_course(0, "cs")
            .unwrap();
        assert_eq!(tree.courses[0].name, "cs");
    }

    #[test]
    fn test_delete_course_cascades() {
        let policy = HierarchyPolicy::default();
        let mut tree = sample_tree();
        let removed = HierarchyEditor::new(&mut tree, &policy)
            .delete_course(0)
            .unwrap();
        assert_eq!(removed.years.len(), 2);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_delete_year_with_departments_is_blocked() {
        let policy = HierarchyPolicy::default();
        let mut tree = sample_tree();
        let before = tree.clone();

        let err = HierarchyEditor::new(&mut tree, &policy)
            .delete_year(0, 0)
            .unwrap_err();

        assert!(matches!(err, EditError::HasChildren(_)));
        assert!(err.to_string().contains("has existing departments"));
        assert_eq!(tree, before);

        HierarchyEditor::new(&mut tree, &policy)
            .delete_year(0, 1)
            .unwrap();
        assert_eq!(tree.courses[0].years.len(), 1);
    }

    #[test]
    fn test_delete_department_with_subjects_is_blocked() {
        let policy = HierarchyPolicy::default();
        let mut tree = sample_tree();
        let err = HierarchyEditor::new(&mut tree, &policy)
            .delete_department(0, 0, 0)
            .unwrap_err();
        assert!(err.to_string().contains("has existing subjects"));
    }

    #[test]
    fn test_add_year_checks_policy_and_duplicates() {
        let policy = HierarchyPolicy::default();
        let mut tree = sample_tree();
        let mut editor = HierarchyEditor::new(&mut tree, &policy);

        assert!(editor.add_year(0, "5").is_err());
        assert!(editor.add_year(0, "1").is_err());
        assert_eq!(editor.add_year(0, "3").unwrap(), 2);
    }

    #[test]
    fn test_invalid_selection() {
        let policy = HierarchyPolicy::default();
        let mut tree = sample_tree();
        let before = tree.clone();
        let mut editor = HierarchyEditor::new(&mut tree, &policy);

        assert!(matches!(
            editor.add_department(0, 9, "AI"),
            Err(EditError::InvalidSelection(_))
        ));
        assert!(matches!(
            editor.edit_batch(0, 0, 0, 0, 7, "Z"),
            Err(EditError::InvalidSelection(_))
        ));
        assert!(matches!(
            editor.delete_course(4),
            Err(EditError::InvalidSelection(_))
        ));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_add_subject_uses_default_batches() {
        let policy = HierarchyPolicy::default();
        let mut tree = sample_tree();
        let index = HierarchyEditor::new(&mut tree, &policy)
            .add_subject(0, 0, 0, &input("Compilers", " CS402 "))
            .unwrap();

        let subject = &tree.courses[0].years[0].departments[0].subjects[index];
        assert_eq!(subject.code, "CS402");
        assert_eq!(subject.subject_type, SubjectType::Practical);
        assert_eq!(subject.batches, policy.default_batches);
    }

    #[test]
    fn test_edit_subject_keeps_batches() {
        let policy = HierarchyPolicy::default();
        let mut tree = sample_tree();
        HierarchyEditor::new(&mut tree, &policy)
            .edit_subject(0, 0, 0, 0, &input("Computer Networks", "CS301"))
            .unwrap();

        let subject = &tree.courses[0].years[0].departments[0].subjects[0];
        assert_eq!(subject.name, "Computer Networks");
        assert_eq!(subject.batches, vec!["A", "B"]);
    }

    #[test]
    fn test_subject_code_too_long_reports_code_field() {
        let policy = HierarchyPolicy::default();
        let mut tree = sample_tree();
        let err = HierarchyEditor::new(&mut tree, &policy)
            .add_subject(0, 0, 0, &input("Compilers", &"X".repeat(21)))
            .unwrap_err();

        match err {
            EditError::Validation(field_err) => assert_eq!(field_err.field, "code"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_batch_operations() {
        let policy = HierarchyPolicy::default();
        let mut tree = sample_tree();
        let mut editor = HierarchyEditor::new(&mut tree, &policy);

        assert!(editor.add_batch(0, 0, 0, 0, "A").is_err());
        assert_eq!(editor.add_batch(0, 0, 0, 0, "a").unwrap(), 2);
        editor.edit_batch(0, 0, 0, 0, 2, "C").unwrap();
        assert_eq!(editor.delete_batch(0, 0, 0, 0, 0).unwrap(), "A");

        assert_eq!(
            tree.courses[0].years[0].departments[0].subjects[0].batches,
            vec!["B", "C"]
        );
    }

    #[test]
    fn test_error_status_mapping() {
        use axum::http::StatusCode;

        let validation = EditError::Validation(FieldError {
            field: "name",
            message: "Course name is required".into(),
        });
        let app = validation.into_app_error();
        assert_eq!(app.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(app.field.as_deref(), Some("name"));

        assert_eq!(
            EditError::InvalidSelection("x".into()).into_app_error().status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            EditError::HasChildren("x".into()).into_app_error().status,
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_siblings_stay_unique_across_edits() {
        let policy = HierarchyPolicy::default();
        let mut tree = HierarchyTree::default();
        let mut editor = HierarchyEditor::new(&mut tree, &policy);

        assert_eq!(editor.add_course("Arts").unwrap(), 0);
        assert!(editor.add_course(" arts ").is_err());
        assert_eq!(editor.add_course("Science").unwrap(), 1);
        assert!(editor.edit_course(1, "ARTS").is_err());
        editor.edit_course(1, "Sciences").unwrap();

        editor.add_year(0, "1").unwrap();
        assert!(editor.add_year(0, "1").is_err());
        editor.add_year(0, "2").unwrap();
        assert!(editor.edit_year(0, 1, "1").is_err());

        editor.add_department(0, 0, "History").unwrap();
        assert!(editor.add_department(0, 0, "HISTORY").is_err());
        editor.add_subject(0, 0, 0, &input("History of Art", "HA1")).unwrap();
        assert!(editor.add_subject(0, 0, 0, &input("history of art", "")).is_err());

        editor.add_batch(0, 0, 0, 0, "a").unwrap();
        assert!(editor.add_batch(0, 0, 0, 0, "A").is_err());
        assert!(editor.edit_batch(0, 0, 0, 0, 4, "B").is_err());

        assert!(validation::validate_tree(&policy, &tree).is_empty());
        assert_eq!(tree.courses.len(), 2);
        assert_eq!(tree.courses[0].years.len(), 2);
        assert_eq!(
            tree.courses[0].years[0].departments[0].subjects[0].batches,
            vec!["A", "B", "C", "D", "a"]
        );
    }
}
