//! # Feedbackhub Core
//!
//! Core types shared by every Feedbackhub crate.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//!
//! # Example
//!
//! ```ignore
//! use feedbackhub_core::AppError;
//!
//! let error = AppError::not_found(anyhow::anyhow!("Edit session not found"));
//! ```

pub mod errors;

pub use errors::{AppError, ErrorResponse};
