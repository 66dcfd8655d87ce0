//! The academic hierarchy tree.
//!
//! A [`HierarchyTree`] is the editable source of truth for one institution:
//! Course → Year → Department → Subject → Batch, each level an ordered list of
//! owned values. The persisted course index and subject table are views
//! derived from it (see [`crate::persisted`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HierarchyTree {
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Course {
    pub name: String,
    #[serde(default)]
    pub years: Vec<Year>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Year {
    pub name: String,
    #[serde(default)]
    pub departments: Vec<Department>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Department {
    pub name: String,
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Subject {
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(rename = "type", default)]
    pub subject_type: SubjectType,
    #[serde(default)]
    pub batches: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum SubjectType {
    #[default]
    Theory,
    Practical,
    Tutorial,
    #[serde(rename = "Theory / Practical")]
    TheoryPractical,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown subject type '{0}'")]
pub struct UnknownSubjectType(pub String);

impl SubjectType {
    pub const ALL: [SubjectType; 4] = [
        SubjectType::Theory,
        SubjectType::Practical,
        SubjectType::Tutorial,
        SubjectType::TheoryPractical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectType::Theory => "Theory",
            SubjectType::Practical => "Practical",
            SubjectType::Tutorial => "Tutorial",
            SubjectType::TheoryPractical => "Theory / Practical",
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectType {
    type Err = UnknownSubjectType;

    /// Case-insensitive; whitespace around the slash of the combined type is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        match compact.as_str() {
            "theory" => Ok(SubjectType::Theory),
            "practical" => Ok(SubjectType::Practical),
            "tutorial" => Ok(SubjectType::Tutorial),
            "theory/practical" => Ok(SubjectType::TheoryPractical),
            _ => Err(UnknownSubjectType(s.to_string())),
        }
    }
}

impl HierarchyTree {
    pub fn new(courses: Vec<Course>) -> Self {
        Self { courses }
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Distinct department names referenced anywhere in the tree.
    ///
    /// Names are compared case-insensitively after trimming; the first
    /// spelling encountered is the one returned.
    pub fn department_names(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut names = Vec::new();

        for department in self
            .courses
            .iter()
            .flat_map(|c| &c.years)
            .flat_map(|y| &y.departments)
        {
            let name = department.name.trim();
            if !name.is_empty() && seen.insert(name.to_lowercase()) {
                names.push(name.to_string());
            }
        }

        names
    }
}

impl Course {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            years: Vec::new(),
        }
    }

    pub fn with_years(mut self, years: Vec<Year>) -> Self {
        self.years = years;
        self
    }
}

impl Year {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            departments: Vec::new(),
        }
    }

    pub fn with_departments(mut self, departments: Vec<Department>) -> Self {
        self.departments = departments;
        self
    }
}

impl Department {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subjects: Vec::new(),
        }
    }

    pub fn with_subjects(mut self, subjects: Vec<Subject>) -> Self {
        self.subjects = subjects;
        self
    }
}

impl Subject {
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        subject_type: SubjectType,
        batches: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            subject_type,
            batches,
        }
    }
}
