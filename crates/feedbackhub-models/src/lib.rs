//! # Feedbackhub Models
//!
//! Domain models for the academic hierarchy of the Feedbackhub API.
//!
//! # Modules
//!
//! - [`hierarchy`]: The editable Course → Year → Department → Subject → Batch tree
//! - [`persisted`]: Course index and subject table views, stored documents and
//!   legacy decoding
//! - [`departments`]: Flat department directory records
//! - [`institutions`]: Institution (tenant) records
//! - [`ids`]: Strongly-typed IDs
//!
//! # Example
//!
//! ```ignore
//! use feedbackhub_models::{Course, HierarchyConfig, HierarchyTree, Year};
//!
//! let tree = HierarchyTree::new(vec![Course::new("MBA").with_years(vec![Year::new("1")])]);
//! let config = HierarchyConfig::from_tree(&tree);
//! assert_eq!(config.course_index.years("MBA"), ["1"]);
//! ```

pub mod departments;
pub mod hierarchy;
pub mod ids;
pub mod institutions;
pub mod persisted;

pub use departments::{DepartmentRecord, NewDepartment, generate_department_code};
pub use hierarchy::{
    Course, Department, HierarchyTree, Subject, SubjectType, UnknownSubjectType, Year,
};
pub use ids::{DepartmentId, EditSessionId, InstitutionId};
pub use institutions::Institution;
pub use persisted::{
    ConfigDocument, CourseIndex, CourseIndexEntry, HierarchyConfig, Normalized, SubjectEntry,
    SubjectTable,
};
