//! Administrative operations behind `feedbackhub-cli`.

use anyhow::Context;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use feedbackhub_config::HierarchyPolicy;
use feedbackhub_db::HierarchyStore;
use feedbackhub_models::{HierarchyTree, Institution, InstitutionId};

use crate::modules::hierarchy::defaults::DefaultHierarchy;
use crate::modules::hierarchy::validation::TreeViolation;
use crate::modules::hierarchy::{HierarchyService, SaveReport};

pub struct SeedOptions {
    pub institution_id: InstitutionId,
    /// Registers (or renames) the institution when given.
    pub name: Option<String>,
    /// Overrides the stored institution code when picking the default.
    pub code: Option<String>,
}

#[derive(Debug)]
pub enum SeedOutcome {
    Saved {
        default: &'static str,
        report: SaveReport,
    },
    /// A hierarchy is already stored and overwriting was not requested.
    AlreadyConfigured,
}

pub async fn seed_defaults(
    store: &Arc<dyn HierarchyStore>,
    policy: &HierarchyPolicy,
    options: SeedOptions,
    overwrite: bool,
) -> anyhow::Result<SeedOutcome> {
    let id = options.institution_id;

    if let Some(name) = options.name {
        store
            .upsert_institution(&Institution {
                id,
                name,
                code: options.code.clone(),
            })
            .await
            .context("Failed to register institution")?;
    }

    if !overwrite && store.get_config(id).await?.is_some() {
        return Ok(SeedOutcome::AlreadyConfigured);
    }

    let code = match options.code {
        Some(code) => Some(code),
        None => store.get_institution(id).await?.and_then(|i| i.code),
    };
    let default = DefaultHierarchy::for_code(code.as_deref());
    let tree = default.build(&policy.default_batches);

    let report = HierarchyService::save(store, id, &tree)
        .await
        .map_err(|e| e.error)?;

    Ok(SeedOutcome::Saved {
        default: default.name(),
        report,
    })
}

/// Indented outline of a tree, one node per line.
pub fn render_tree(tree: &HierarchyTree) -> String {
    let mut out = String::new();
    for course in &tree.courses {
        let _ = writeln!(out, "{}", course.name);
        for year in &course.years {
            let _ = writeln!(out, "  Year {}", year.name);
            for department in &year.departments {
                let _ = writeln!(out, "    {}", department.name);
                for subject in &department.subjects {
                    let code = if subject.code.is_empty() {
                        String::new()
                    } else {
                        format!(" [{}]", subject.code)
                    };
                    let _ = writeln!(
                        out,
                        "      {}{} ({}) batches: {}",
                        subject.name,
                        code,
                        subject.subject_type,
                        subject.batches.join(", ")
                    );
                }
            }
        }
    }
    out
}

/// Reads a tree from a JSON file and checks it against the naming rules.
pub fn validate_file(policy: &HierarchyPolicy, path: &Path) -> anyhow::Result<Vec<TreeViolation>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let tree: HierarchyTree = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a hierarchy tree", path.display()))?;

    Ok(HierarchyService::prepare_tree(policy, tree)
        .err()
        .unwrap_or_default())
}
