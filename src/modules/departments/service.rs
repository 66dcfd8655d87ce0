use anyhow::anyhow;
use std::sync::Arc;
use tracing::instrument;

use feedbackhub_config::HierarchyPolicy;
use feedbackhub_core::AppError;
use feedbackhub_db::HierarchyStore;
use feedbackhub_models::{DepartmentRecord, InstitutionId};

use crate::modules::hierarchy::{DepartmentSync, HierarchyService};

pub struct DepartmentService;

impl DepartmentService {
    #[instrument(skip(store))]
    pub async fn list(
        store: &dyn HierarchyStore,
        institution_id: InstitutionId,
    ) -> Result<Vec<DepartmentRecord>, AppError> {
        store
            .list_departments(institution_id)
            .await
            .map_err(AppError::bad_gateway)
    }

    /// Re-runs department creation for the saved hierarchy, for institutions
    /// whose last save left some departments uncreated.
    #[instrument(skip(store, policy))]
    pub async fn resync(
        store: &Arc<dyn HierarchyStore>,
        policy: &HierarchyPolicy,
        institution_id: InstitutionId,
    ) -> Result<DepartmentSync, AppError> {
        let loaded = HierarchyService::load(store.as_ref(), policy, institution_id).await?;
        if !loaded.source.is_stored() {
            return Err(AppError::not_found(anyhow!(
                "Institution {} has no saved hierarchy",
                institution_id
            )));
        }

        Ok(HierarchyService::sync_departments(store, institution_id, &loaded.tree).await)
    }
}
