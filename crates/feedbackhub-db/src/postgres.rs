//! PostgreSQL backend: both hierarchy documents live in JSONB columns of
//! `hierarchy_configs`, the department directory in `departments`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{debug, instrument, warn};

use feedbackhub_models::{
    ConfigDocument, DepartmentId, DepartmentRecord, Institution, InstitutionId, NewDepartment,
};

use crate::store::{HierarchyStore, StoreError};

#[derive(Clone, Debug)]
pub struct PgHierarchyStore {
    pool: PgPool,
}

impl PgHierarchyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type ConfigRow = (Json<serde_json::Value>, Json<serde_json::Value>, DateTime<Utc>);

#[async_trait]
impl HierarchyStore for PgHierarchyStore {
    #[instrument(skip(self), fields(db.operation = "SELECT", db.table = "institutions"))]
    async fn get_institution(&self, id: InstitutionId) -> Result<Option<Institution>, StoreError> {
        let institution = sqlx::query_as::<_, Institution>(
            "SELECT id, name, code FROM institutions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(institution)
    }

    #[instrument(skip(self, institution), fields(institution.id = %institution.id, db.operation = "UPSERT", db.table = "institutions"))]
    async fn upsert_institution(&self, institution: &Institution) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO institutions (id, name, code)
               VALUES ($1, $2, $3)
               ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, code = EXCLUDED.code"#,
        )
        .bind(institution.id)
        .bind(&institution.name)
        .bind(&institution.code)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self), fields(db.operation = "SELECT", db.table = "hierarchy_configs"))]
    async fn get_config(&self, id: InstitutionId) -> Result<Option<ConfigDocument>, StoreError> {
        let row = sqlx::query_as::<_, ConfigRow>(
            r#"SELECT course_index, subject_table, updated_at
               FROM hierarchy_configs
               WHERE institution_id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(course_index, subject_table, updated_at)| ConfigDocument {
            course_index: course_index.0,
            subject_table: subject_table.0,
            updated_at: Some(updated_at),
        }))
    }

    #[instrument(skip(self, document), fields(db.operation = "UPSERT", db.table = "hierarchy_configs"))]
    async fn upsert_config(
        &self,
        id: InstitutionId,
        document: &ConfigDocument,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO hierarchy_configs (institution_id, course_index, subject_table, updated_at)
               VALUES ($1, $2, $3, NOW())
               ON CONFLICT (institution_id) DO UPDATE
               SET course_index = EXCLUDED.course_index,
                   subject_table = EXCLUDED.subject_table,
                   updated_at = NOW()"#,
        )
        .bind(id)
        .bind(Json(&document.course_index))
        .bind(Json(&document.subject_table))
        .execute(&self.pool)
        .await?;

        debug!(institution.id = %id, "Hierarchy configuration upserted");
        Ok(())
    }

    #[instrument(skip(self), fields(db.operation = "SELECT", db.table = "departments"))]
    async fn list_departments(
        &self,
        id: InstitutionId,
    ) -> Result<Vec<DepartmentRecord>, StoreError> {
        let departments = sqlx::query_as::<_, DepartmentRecord>(
            r#"SELECT id, institution_id, name, code, created_at
               FROM departments
               WHERE institution_id = $1
               ORDER BY name"#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(departments)
    }

    #[instrument(skip(self, new), fields(department.name = %new.name, db.operation = "INSERT", db.table = "departments"))]
    async fn create_department(
        &self,
        new: &NewDepartment,
    ) -> Result<DepartmentRecord, StoreError> {
        sqlx::query_as::<_, DepartmentRecord>(
            r#"INSERT INTO departments (id, institution_id, name, code)
               VALUES ($1, $2, $3, $4)
               RETURNING id, institution_id, name, code, created_at"#,
        )
        .bind(DepartmentId::new())
        .bind(new.institution_id)
        .bind(&new.name)
        .bind(&new.code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                warn!(department.name = %new.name, "Department already exists in directory");
                return StoreError::DuplicateDepartment(new.name.clone());
            }
            StoreError::from(e)
        })
    }
}
