//! Read-only lookups over an institution's hierarchy, as used by the
//! cascading course → year → department → subject → batch selectors.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::*;
pub use router::init_catalog_router;
