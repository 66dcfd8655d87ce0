use anyhow::anyhow;
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use feedbackhub_config::HierarchyPolicy;
use feedbackhub_core::AppError;
use feedbackhub_db::{HierarchyStore, StoreError};
use feedbackhub_models::{HierarchyConfig, HierarchyTree, InstitutionId, NewDepartment};

use crate::metrics::{
    track_department_created, track_department_creation_failure, track_hierarchy_save,
};
use crate::modules::hierarchy::defaults::DefaultHierarchy;
use crate::modules::hierarchy::model::{
    DepartmentFailure, DepartmentSync, HierarchySource, SaveReport, SaveStatus,
};
use crate::modules::hierarchy::validation::{TreeViolation, trim_tree, validate_tree};

/// A tree ready for editing, plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedHierarchy {
    pub tree: HierarchyTree,
    pub source: HierarchySource,
}

pub struct HierarchyService;

impl HierarchyService {
    /// Loads the institution's stored hierarchy, or the built-in default for
    /// its code when nothing has been saved yet.
    #[instrument(skip(store, policy), fields(institution.id = %institution_id))]
    pub async fn load(
        store: &dyn HierarchyStore,
        policy: &HierarchyPolicy,
        institution_id: InstitutionId,
    ) -> Result<LoadedHierarchy, AppError> {
        let stored = store
            .get_config(institution_id)
            .await
            .map_err(AppError::bad_gateway)?;

        if let Some(document) = stored {
            let normalized = HierarchyConfig::normalize(&document, &policy.default_batches)
                .map_err(|e| {
                    error!(institution.id = %institution_id, error = %e, "Stored hierarchy is unreadable");
                    AppError::internal(anyhow!("Stored hierarchy could not be decoded: {}", e))
                })?;

            for warning in &normalized.warnings {
                warn!(institution.id = %institution_id, %warning, "Normalized stored hierarchy");
            }
            debug!(
                institution.id = %institution_id,
                courses = normalized.tree.courses.len(),
                "Loaded stored hierarchy"
            );

            return Ok(LoadedHierarchy {
                tree: normalized.tree,
                source: HierarchySource::Stored {
                    updated_at: document.updated_at,
                },
            });
        }

        let institution = store
            .get_institution(institution_id)
            .await
            .map_err(AppError::bad_gateway)?;
        let default = DefaultHierarchy::for_code(institution.as_ref().and_then(|i| i.code.as_deref()));

        info!(
            institution.id = %institution_id,
            default = default.name(),
            "No stored hierarchy, using built-in default"
        );

        Ok(LoadedHierarchy {
            tree: default.build(&policy.default_batches),
            source: HierarchySource::Default {
                name: default.name().to_string(),
            },
        })
    }

    /// Trims a submitted tree and checks every node of it.
    pub fn prepare_tree(
        policy: &HierarchyPolicy,
        mut tree: HierarchyTree,
    ) -> Result<HierarchyTree, Vec<TreeViolation>> {
        trim_tree(&mut tree);
        let violations = validate_tree(policy, &tree);
        if violations.is_empty() {
            Ok(tree)
        } else {
            Err(violations)
        }
    }

    /// Persists the tree and brings the department directory in line with it.
    ///
    /// Only the configuration upsert decides success. Department creation
    /// problems are reported in the returned [`SaveReport`].
    #[instrument(skip(store, tree), fields(institution.id = %institution_id, courses = tree.courses.len()))]
    pub async fn save(
        store: &Arc<dyn HierarchyStore>,
        institution_id: InstitutionId,
        tree: &HierarchyTree,
    ) -> Result<SaveReport, AppError> {
        let document = HierarchyConfig::from_tree(tree)
            .to_document()
            .map_err(AppError::internal)?;

        if let Err(e) = store.upsert_config(institution_id, &document).await {
            error!(institution.id = %institution_id, error = %e, "Failed to save hierarchy");
            track_hierarchy_save("failed");
            return Err(AppError::bad_gateway(e));
        }

        info!(institution.id = %institution_id, "Hierarchy configuration saved");

        let sync = Self::sync_departments(store, institution_id, tree).await;
        let status = if sync.failed.is_empty() {
            SaveStatus::Saved
        } else {
            SaveStatus::SavedWithWarnings
        };
        track_hierarchy_save(match status {
            SaveStatus::Saved => "saved",
            SaveStatus::SavedWithWarnings => "saved_with_warnings",
        });

        Ok(SaveReport {
            status,
            course_count: tree.courses.len(),
            departments_created: sync.created,
            departments_failed: sync.failed,
            departments_skipped: sync.skipped,
            saved_at: Utc::now(),
        })
    }

    /// Creates a directory record for every department the tree names that
    /// the directory does not have yet.
    ///
    /// Creations run concurrently and never fail the caller; failures are
    /// logged and listed in the result.
    #[instrument(skip(store, tree), fields(institution.id = %institution_id))]
    pub async fn sync_departments(
        store: &Arc<dyn HierarchyStore>,
        institution_id: InstitutionId,
        tree: &HierarchyTree,
    ) -> DepartmentSync {
        let names = tree.department_names();
        if names.is_empty() {
            return DepartmentSync::default();
        }

        let existing = match store.list_departments(institution_id).await {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    institution.id = %institution_id,
                    error = %e,
                    "Could not list departments, skipping department sync"
                );
                return DepartmentSync {
                    skipped: true,
                    ..DepartmentSync::default()
                };
            }
        };

        let missing: Vec<String> = names
            .into_iter()
            .filter(|name| !existing.iter().any(|record| record.matches_name(name)))
            .collect();

        if missing.is_empty() {
            debug!(institution.id = %institution_id, "Department directory already up to date");
            return DepartmentSync::default();
        }

        let mut tasks = JoinSet::new();
        for name in missing {
            let store = Arc::clone(store);
            tasks.spawn(async move {
                let new = NewDepartment::for_name(institution_id, &name);
                let result = store.create_department(&new).await;
                (name, result)
            });
        }

        let mut sync = DepartmentSync::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, Ok(record))) => {
                    info!(
                        institution.id = %institution_id,
                        department.id = %record.id,
                        department.code = %record.code,
                        "Created department"
                    );
                    track_department_created();
                    sync.created.push(name);
                }
                Ok((name, Err(StoreError::DuplicateDepartment(_)))) => {
                    // Created by a concurrent save since the listing.
                    debug!(institution.id = %institution_id, department = %name, "Department already exists");
                }
                Ok((name, Err(e))) => {
                    warn!(
                        institution.id = %institution_id,
                        department = %name,
                        error = %e,
                        "Failed to create department"
                    );
                    track_department_creation_failure();
                    sync.failed.push(DepartmentFailure {
                        name,
                        error: e.to_string(),
                    });
                }
                Err(e) => {
                    error!(institution.id = %institution_id, error = %e, "Department creation task failed");
                    track_department_creation_failure();
                }
            }
        }

        sync.created.sort();
        sync.failed.sort_by(|a, b| a.name.cmp(&b.name));
        sync
    }
}
