//! # Feedbackhub DB
//!
//! The document store the academic hierarchy is persisted to.
//!
//! - [`store`]: The [`HierarchyStore`] contract and [`StoreError`]
//! - [`postgres`]: PostgreSQL backend (JSONB documents)
//! - [`memory`]: Process-local backend for development and tests
//!
//! # Example
//!
//! ```ignore
//! use feedbackhub_db::{PgHierarchyStore, init_db_pool, run_migrations};
//!
//! let pool = init_db_pool(&database_url).await?;
//! run_migrations(&pool).await?;
//! let store = PgHierarchyStore::new(pool);
//! ```

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::InMemoryStore;
pub use postgres::PgHierarchyStore;
pub use store::{HierarchyStore, StoreError};

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Connects a PostgreSQL pool to `database_url`.
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

/// Applies the embedded migrations under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
