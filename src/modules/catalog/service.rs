use tracing::instrument;

use feedbackhub_config::HierarchyPolicy;
use feedbackhub_core::AppError;
use feedbackhub_db::HierarchyStore;
use feedbackhub_models::{HierarchyConfig, InstitutionId};

use crate::modules::hierarchy::HierarchyService;

pub struct CatalogService;

impl CatalogService {
    /// The institution's course index and subject table, derived from the
    /// same tree an editor would load.
    #[instrument(skip(store, policy))]
    pub async fn config(
        store: &dyn HierarchyStore,
        policy: &HierarchyPolicy,
        institution_id: InstitutionId,
    ) -> Result<HierarchyConfig, AppError> {
        let loaded = HierarchyService::load(store, policy, institution_id).await?;
        Ok(HierarchyConfig::from_tree(&loaded.tree))
    }
}
