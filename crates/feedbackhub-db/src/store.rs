//! The document store contract the hierarchy core depends on.
//!
//! Every call is a single round trip with no cross-call transaction: a save
//! that upserts the configuration and then creates departments may stop
//! halfway, so every operation here must be safe to repeat.

use async_trait::async_trait;
use thiserror::Error;

use feedbackhub_models::{
    ConfigDocument, DepartmentRecord, Institution, InstitutionId, NewDepartment,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid stored document: {0}")]
    Document(#[from] serde_json::Error),
    #[error("department '{0}' already exists")]
    DuplicateDepartment(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait HierarchyStore: Send + Sync {
    async fn get_institution(&self, id: InstitutionId) -> Result<Option<Institution>, StoreError>;

    async fn upsert_institution(&self, institution: &Institution) -> Result<(), StoreError>;

    /// Stored course index and subject table, if the institution saved one.
    async fn get_config(&self, id: InstitutionId) -> Result<Option<ConfigDocument>, StoreError>;

    /// Replace both documents. Idempotent.
    async fn upsert_config(
        &self,
        id: InstitutionId,
        document: &ConfigDocument,
    ) -> Result<(), StoreError>;

    async fn list_departments(&self, id: InstitutionId)
    -> Result<Vec<DepartmentRecord>, StoreError>;

    async fn create_department(&self, new: &NewDepartment)
    -> Result<DepartmentRecord, StoreError>;
}
