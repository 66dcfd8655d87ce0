//! # Feedbackhub Config
//!
//! Configuration types for the Feedbackhub API, loaded from environment variables:
//!
//! - [`hierarchy`]: Naming policy applied by the academic hierarchy validators
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`server`]: Listen addresses and edit-session lifetime
//! - [`store`]: Which document store backend to use
//!
//! # Example
//!
//! ```ignore
//! use feedbackhub_config::{CorsConfig, HierarchyPolicy, ServerConfig, StoreBackend};
//!
//! let policy = HierarchyPolicy::from_env();
//! let cors_config = CorsConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! let backend = StoreBackend::from_env()?;
//! ```

pub mod cors;
pub mod hierarchy;
pub mod server;
pub mod store;

pub use cors::CorsConfig;
pub use hierarchy::HierarchyPolicy;
pub use server::ServerConfig;
pub use store::{ConfigError, StoreBackend};
