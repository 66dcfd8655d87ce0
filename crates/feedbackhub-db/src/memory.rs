//! Process-local store used for development, demos and tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use feedbackhub_models::{
    ConfigDocument, DepartmentId, DepartmentRecord, Institution, InstitutionId, NewDepartment,
};

use crate::store::{HierarchyStore, StoreError};

#[derive(Debug, Default)]
struct MemoryState {
    institutions: HashMap<InstitutionId, Institution>,
    configs: HashMap<InstitutionId, ConfigDocument>,
    departments: Vec<DepartmentRecord>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size of an institution's department directory.
    pub async fn department_count(&self, id: InstitutionId) -> usize {
        self.state
            .read()
            .await
            .departments
            .iter()
            .filter(|d| d.institution_id == id)
            .count()
    }
}

#[async_trait]
impl HierarchyStore for InMemoryStore {
    async fn get_institution(&self, id: InstitutionId) -> Result<Option<Institution>, StoreError> {
        Ok(self.state.read().await.institutions.get(&id).cloned())
    }

    async fn upsert_institution(&self, institution: &Institution) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .institutions
            .insert(institution.id, institution.clone());
        Ok(())
    }

    async fn get_config(&self, id: InstitutionId) -> Result<Option<ConfigDocument>, StoreError> {
        Ok(self.state.read().await.configs.get(&id).cloned())
    }

    async fn upsert_config(
        &self,
        id: InstitutionId,
        document: &ConfigDocument,
    ) -> Result<(), StoreError> {
        let mut stored = document.clone();
        stored.updated_at = Some(Utc::now());
        self.state.write().await.configs.insert(id, stored);
        Ok(())
    }

    async fn list_departments(
        &self,
        id: InstitutionId,
    ) -> Result<Vec<DepartmentRecord>, StoreError> {
        let state = self.state.read().await;
        let mut departments: Vec<_> = state
            .departments
            .iter()
            .filter(|d| d.institution_id == id)
            .cloned()
            .collect();
        departments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(departments)
    }

    async fn create_department(
        &self,
        new: &NewDepartment,
    ) -> Result<DepartmentRecord, StoreError> {
        let mut state = self.state.write().await;

        if state
            .departments
            .iter()
            .any(|d| d.institution_id == new.institution_id && d.matches_name(&new.name))
        {
            return Err(StoreError::DuplicateDepartment(new.name.clone()));
        }

        let record = DepartmentRecord {
            id: DepartmentId::new(),
            institution_id: new.institution_id,
            name: new.name.clone(),
            code: new.code.clone(),
            created_at: Utc::now(),
        };
        state.departments.push(record.clone());

        Ok(record)
    }
}
