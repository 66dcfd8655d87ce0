//! Persisted views of the hierarchy and the load-boundary encodings.
//!
//! Two documents are stored per institution:
//!
//! - the **course index**: ordered courses, their ordered years and, per year,
//!   the ordered department names. Cascading selectors read this.
//! - the **subject table**: course → year → department → subject name →
//!   `{code, type, batches}`.
//!
//! Both are regenerated from a [`HierarchyTree`] on every save and never
//! patched in place. On load, the subject table may still use the legacy
//! encoding where a department maps to a plain list of subject names; that
//! union exists only in [`RawSubjectTable`] and is resolved by
//! [`HierarchyConfig::normalize`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::hierarchy::{Course, Department, HierarchyTree, Subject, SubjectType, Year};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CourseIndex {
    pub courses: Vec<CourseIndexEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CourseIndexEntry {
    pub name: String,
    #[serde(default)]
    pub years: Vec<String>,
    /// Year name → ordered department names.
    #[serde(default)]
    pub departments: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubjectEntry {
    pub code: String,
    #[serde(rename = "type")]
    pub subject_type: SubjectType,
    pub batches: Vec<String>,
}

/// Subject name → entry.
pub type DepartmentSubjects = BTreeMap<String, SubjectEntry>;
/// Department name → subjects.
pub type YearSubjects = BTreeMap<String, DepartmentSubjects>;
/// Year name → departments.
pub type CourseSubjects = BTreeMap<String, YearSubjects>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct SubjectTable(pub BTreeMap<String, CourseSubjects>);

/// Both derived views, as written by a save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HierarchyConfig {
    pub course_index: CourseIndex,
    pub subject_table: SubjectTable,
}

/// Raw documents exchanged with the document store.
///
/// The store does not interpret them; decoding (including legacy formats)
/// happens in [`HierarchyConfig::normalize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConfigDocument {
    #[schema(value_type = Object)]
    pub course_index: serde_json::Value,
    #[schema(value_type = Object)]
    pub subject_table: serde_json::Value,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Subject table as found in storage, before normalisation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RawSubjectTable(pub BTreeMap<String, BTreeMap<String, BTreeMap<String, RawSubjects>>>);

/// The two encodings of a department's subjects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawSubjects {
    /// Legacy: subject names only.
    Names(Vec<String>),
    /// Current: subject name → `{code, type, batches}`.
    Entries(BTreeMap<String, RawSubjectEntry>),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSubjectEntry {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(rename = "type", default)]
    pub subject_type: Option<String>,
    #[serde(default)]
    pub batches: Option<Vec<String>>,
}

/// Outcome of decoding stored documents into a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub tree: HierarchyTree,
    /// Things that were defaulted or dropped while decoding.
    pub warnings: Vec<String>,
}

impl HierarchyConfig {
    /// Derive both persisted views from the tree.
    pub fn from_tree(tree: &HierarchyTree) -> Self {
        let mut courses = Vec::with_capacity(tree.courses.len());
        let mut table = BTreeMap::new();

        for course in &tree.courses {
            let mut entry = CourseIndexEntry {
                name: course.name.clone(),
                years: Vec::with_capacity(course.years.len()),
                departments: BTreeMap::new(),
            };
            let mut course_subjects = CourseSubjects::new();

            for year in &course.years {
                entry.years.push(year.name.clone());
                entry.departments.insert(
                    year.name.clone(),
                    year.departments.iter().map(|d| d.name.clone()).collect(),
                );

                let year_subjects: YearSubjects = year
                    .departments
                    .iter()
                    .map(|department| {
                        let subjects = department
                            .subjects
                            .iter()
                            .map(|s| {
                                (
                                    s.name.clone(),
                                    SubjectEntry {
                                        code: s.code.clone(),
                                        subject_type: s.subject_type,
                                        batches: s.batches.clone(),
                                    },
                                )
                            })
                            .collect();
                        (department.name.clone(), subjects)
                    })
                    .collect();
                course_subjects.insert(year.name.clone(), year_subjects);
            }

            courses.push(entry);
            table.insert(course.name.clone(), course_subjects);
        }

        Self {
            course_index: CourseIndex { courses },
            subject_table: SubjectTable(table),
        }
    }

    pub fn to_document(&self) -> Result<ConfigDocument, serde_json::Error> {
        Ok(ConfigDocument {
            course_index: serde_json::to_value(&self.course_index)?,
            subject_table: serde_json::to_value(&self.subject_table)?,
            updated_at: None,
        })
    }

    /// Decode stored documents into the canonical tree.
    ///
    /// The course index decides which courses, years and departments exist and
    /// in which order. Subjects are looked up in the subject table; legacy name
    /// lists get an empty code, type `Theory` and `default_batches`.
    pub fn normalize(
        document: &ConfigDocument,
        default_batches: &[String],
    ) -> Result<Normalized, serde_json::Error> {
        let index: CourseIndex = serde_json::from_value(document.course_index.clone())?;
        let raw: RawSubjectTable = if document.subject_table.is_null() {
            RawSubjectTable::default()
        } else {
            serde_json::from_value(document.subject_table.clone())?
        };

        Ok(normalize_parts(&index, &raw, default_batches))
    }
}

fn normalize_parts(
    index: &CourseIndex,
    raw: &RawSubjectTable,
    default_batches: &[String],
) -> Normalized {
    let mut warnings = Vec::new();
    let mut courses = Vec::with_capacity(index.courses.len());

    for entry in &index.courses {
        let course_table = raw.0.get(&entry.name);
        let mut years = Vec::with_capacity(entry.years.len());

        for year_name in &entry.years {
            let year_table = course_table.and_then(|c| c.get(year_name));
            let department_names = entry
                .departments
                .get(year_name)
                .map(Vec::as_slice)
                .unwrap_or_default();

            let departments = department_names
                .iter()
                .map(|department_name| {
                    let subjects = match year_table.and_then(|y| y.get(department_name)) {
                        Some(raw_subjects) => decode_subjects(
                            raw_subjects,
                            default_batches,
                            &mut warnings,
                            &format!("{}/{}/{}", entry.name, year_name, department_name),
                        ),
                        None => Vec::new(),
                    };
                    Department::new(department_name.clone()).with_subjects(subjects)
                })
                .collect();

            if let Some(year_table) = year_table {
                for orphan in year_table
                    .keys()
                    .filter(|name| !department_names.contains(*name))
                {
                    warnings.push(format!(
                        "dropped subjects of {}/{}/{}: department not in course index",
                        entry.name, year_name, orphan
                    ));
                }
            }

            years.push(Year::new(year_name.clone()).with_departments(departments));
        }

        for orphan in entry.departments.keys().filter(|y| !entry.years.contains(*y)) {
            warnings.push(format!(
                "dropped departments of {}/{}: year not in course index",
                entry.name, orphan
            ));
        }

        courses.push(Course::new(entry.name.clone()).with_years(years));
    }

    Normalized {
        tree: HierarchyTree::new(courses),
        warnings,
    }
}

fn decode_subjects(
    raw: &RawSubjects,
    default_batches: &[String],
    warnings: &mut Vec<String>,
    location: &str,
) -> Vec<Subject> {
    match raw {
        RawSubjects::Names(names) => names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(|name| Subject::new(name, "", SubjectType::Theory, default_batches.to_vec()))
            .collect(),
        RawSubjects::Entries(entries) => entries
            .iter()
            .map(|(name, entry)| {
                let subject_type = match entry.subject_type.as_deref() {
                    None => SubjectType::Theory,
                    Some(raw_type) => raw_type.parse().unwrap_or_else(|_| {
                        warnings.push(format!(
                            "subject {}/{} has unknown type '{}', using Theory",
                            location, name, raw_type
                        ));
                        SubjectType::Theory
                    }),
                };
                Subject::new(
                    name.clone(),
                    entry.code.clone().unwrap_or_default(),
                    subject_type,
                    entry
                        .batches
                        .clone()
                        .unwrap_or_else(|| default_batches.to_vec()),
                )
            })
            .collect(),
    }
}

impl CourseIndex {
    pub fn course_names(&self) -> Vec<&str> {
        self.courses.iter().map(|c| c.name.as_str()).collect()
    }

    fn entry(&self, course: &str) -> Option<&CourseIndexEntry> {
        self.courses.iter().find(|c| c.name == course)
    }

    /// Years of a course; empty when the course is unknown.
    pub fn years(&self, course: &str) -> &[String] {
        self.entry(course).map(|c| c.years.as_slice()).unwrap_or_default()
    }

    /// Departments of a course year; empty when either is unknown.
    pub fn departments(&self, course: &str, year: &str) -> &[String] {
        self.entry(course)
            .and_then(|c| c.departments.get(year))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl SubjectTable {
    pub fn department(&self, course: &str, year: &str, department: &str) -> Option<&DepartmentSubjects> {
        self.0.get(course)?.get(year)?.get(department)
    }

    /// Subjects of a department, ordered by name.
    pub fn subjects(&self, course: &str, year: &str, department: &str) -> Vec<(&str, &SubjectEntry)> {
        self.department(course, year, department)
            .map(|subjects| subjects.iter().map(|(name, entry)| (name.as_str(), entry)).collect())
            .unwrap_or_default()
    }

    pub fn batches(&self, course: &str, year: &str, department: &str, subject: &str) -> &[String] {
        self.department(course, year, department)
            .and_then(|subjects| subjects.get(subject))
            .map(|entry| entry.batches.as_slice())
            .unwrap_or_default()
    }
}
