//! The academic hierarchy: loading, editing, validating and saving one
//! institution's Course → Year → Department → Subject → Batch tree.

pub mod controller;
pub mod defaults;
pub mod editor;
pub mod model;
pub mod router;
pub mod service;
pub mod sessions;
pub mod validation;

pub use editor::{EditError, HierarchyEditor, SubjectInput};
pub use model::*;
pub use router::{init_institution_hierarchy_router, init_sessions_router};
pub use service::{HierarchyService, LoadedHierarchy};
pub use sessions::{SessionError, SessionRegistry};
