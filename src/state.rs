use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use feedbackhub_config::{CorsConfig, HierarchyPolicy, ServerConfig, StoreBackend};
use feedbackhub_db::{HierarchyStore, InMemoryStore, PgHierarchyStore, init_db_pool, run_migrations};

use crate::modules::hierarchy::SessionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn HierarchyStore>,
    pub policy: Arc<HierarchyPolicy>,
    pub cors_config: CorsConfig,
    pub server_config: ServerConfig,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(
        store: Arc<dyn HierarchyStore>,
        policy: HierarchyPolicy,
        cors_config: CorsConfig,
        server_config: ServerConfig,
    ) -> Self {
        let sessions = SessionRegistry::new(server_config.edit_session_ttl);
        Self {
            store,
            policy: Arc::new(policy),
            cors_config,
            server_config,
            sessions,
        }
    }
}

/// Connects the configured document store.
pub async fn init_store(backend: &StoreBackend) -> anyhow::Result<Arc<dyn HierarchyStore>> {
    match backend {
        StoreBackend::Postgres { database_url } => {
            let pool = init_db_pool(database_url)
                .await
                .context("Failed to connect to database")?;
            run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            info!("Using PostgreSQL document store");
            Ok(Arc::new(PgHierarchyStore::new(pool)))
        }
        StoreBackend::Memory => {
            info!("Using in-memory document store; data is lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let backend = StoreBackend::from_env()?;
    let store = init_store(&backend).await?;

    Ok(AppState::new(
        store,
        HierarchyPolicy::from_env(),
        CorsConfig::from_env(),
        ServerConfig::from_env(),
    ))
}
