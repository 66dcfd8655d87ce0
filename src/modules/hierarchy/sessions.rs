//! In-process registry of edit sessions.
//!
//! A session holds one institution's tree between load and save. Each session
//! belongs to a single editor client; the registry only guards the map.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use feedbackhub_core::AppError;
use feedbackhub_models::{EditSessionId, HierarchyTree, InstitutionId};

use super::editor::EditError;
use super::model::{EditSessionResponse, HierarchySource, SaveReport, SaveState};
use super::service::LoadedHierarchy;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Edit session {0} not found")]
    NotFound(EditSessionId),

    #[error("A save is already in progress for this session")]
    SaveInProgress,

    #[error(transparent)]
    Edit(#[from] EditError),
}

impl SessionError {
    pub fn into_app_error(self) -> AppError {
        match self {
            err @ SessionError::NotFound(_) => AppError::not_found(err),
            err @ SessionError::SaveInProgress => AppError::conflict(err),
            SessionError::Edit(err) => err.into_app_error(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditSession {
    pub id: EditSessionId,
    pub institution_id: InstitutionId,
    pub source: HierarchySource,
    pub tree: HierarchyTree,
    pub save_state: SaveState,
    pub last_save: Option<SaveReport>,
    pub last_error: Option<String>,
    pub opened_at: DateTime<Utc>,
    touched_at: Instant,
}

impl EditSession {
    fn new(institution_id: InstitutionId, loaded: LoadedHierarchy) -> Self {
        Self {
            id: EditSessionId::new(),
            institution_id,
            source: loaded.source,
            tree: loaded.tree,
            save_state: SaveState::Idle,
            last_save: None,
            last_error: None,
            opened_at: Utc::now(),
            touched_at: Instant::now(),
        }
    }

    pub fn to_response(&self) -> EditSessionResponse {
        EditSessionResponse {
            id: self.id,
            institution_id: self.institution_id,
            source: self.source.clone(),
            save_state: self.save_state,
            last_save: self.last_save.clone(),
            last_error: self.last_error.clone(),
            opened_at: self.opened_at,
            tree: self.tree.clone(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.save_state != SaveState::Saving && self.touched_at.elapsed() > ttl
    }
}

#[derive(Debug, Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<EditSessionId, EditSession>>>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Registers a new session for a freshly loaded tree, evicting idle ones.
    pub async fn open(
        &self,
        institution_id: InstitutionId,
        loaded: LoadedHierarchy,
    ) -> EditSessionResponse {
        let session = EditSession::new(institution_id, loaded);
        let response = session.to_response();

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(self.ttl));
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, "Evicted idle edit sessions");
        }

        sessions.insert(session.id, session);
        debug!(session.id = %response.id, institution.id = %institution_id, "Opened edit session");

        response
    }

    pub async fn get(&self, id: EditSessionId) -> Result<EditSessionResponse, SessionError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(EditSession::to_response)
            .ok_or(SessionError::NotFound(id))
    }

    pub async fn close(&self, id: EditSessionId) -> Result<(), SessionError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(SessionError::NotFound(id))
    }

    /// Applies one edit to the session's tree and returns the new state.
    pub async fn edit<F, R>(&self, id: EditSessionId, apply: F) -> Result<EditSessionResponse, SessionError>
    where
        F: FnOnce(&mut HierarchyTree) -> Result<R, EditError>,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        session.touched_at = Instant::now();

        apply(&mut session.tree)?;
        Ok(session.to_response())
    }

    /// Moves the session into `Saving` and hands out a copy of its tree.
    pub async fn begin_save(
        &self,
        id: EditSessionId,
    ) -> Result<(InstitutionId, HierarchyTree), SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;

        if session.save_state == SaveState::Saving {
            return Err(SessionError::SaveInProgress);
        }

        session.save_state = SaveState::Saving;
        session.touched_at = Instant::now();
        Ok((session.institution_id, session.tree.clone()))
    }

    /// Records the outcome of a save. The tree itself is never touched.
    pub async fn finish_save(&self, id: EditSessionId, outcome: &Result<SaveReport, AppError>) {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(&id) else {
            return;
        };

        match outcome {
            Ok(report) => {
                session.save_state = SaveState::Saved;
                session.last_save = Some(report.clone());
                session.last_error = None;
                session.source = HierarchySource::Stored {
                    updated_at: Some(report.saved_at),
                };
            }
            Err(err) => {
                session.save_state = SaveState::Failed;
                session.last_error = Some(err.error.to_string());
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::hierarchy::model::SaveStatus;
    use feedbackhub_models::Course;

    fn loaded() -> LoadedHierarchy {
        LoadedHierarchy {
            tree: HierarchyTree::new(vec![Course::new("CS")]),
            source: HierarchySource::Default {
                name: "standard".into(),
            },
        }
    }

    fn report() -> SaveReport {
        SaveReport {
            status: SaveStatus::Saved,
            course_count: 1,
            departments_created: vec![],
            departments_failed: vec![],
            departments_skipped: false,
            saved_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_edit_updates_tree() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let session = registry.open(InstitutionId::new(), loaded()).await;

        let updated = registry
            .edit(session.id, |tree| {
                tree.courses.push(Course::new("MBA"));
                Ok::<_, EditError>(())
            })
            .await
            .unwrap();

        assert_eq!(updated.tree.courses.len(), 2);
        assert_eq!(registry.get(session.id).await.unwrap().tree.courses.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let missing = EditSessionId::new();
        assert!(matches!(
            registry.get(missing).await,
            Err(SessionError::NotFound(_))
        ));
        assert!(registry.close(missing).await.is_err());
    }

    #[tokio::test]
    async fn test_second_save_while_saving_is_refused() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let session = registry.open(InstitutionId::new(), loaded()).await;

        registry.begin_save(session.id).await.unwrap();
        assert!(matches!(
            registry.begin_save(session.id).await,
            Err(SessionError::SaveInProgress)
        ));

        registry.finish_save(session.id, &Ok(report())).await;
        let state = registry.get(session.id).await.unwrap();
        assert_eq!(state.save_state, SaveState::Saved);
        assert!(state.source.is_stored());
        assert!(registry.begin_save(session.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_tree() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let session = registry.open(InstitutionId::new(), loaded()).await;

        registry.begin_save(session.id).await.unwrap();
        let failure: Result<SaveReport, AppError> =
            Err(AppError::bad_gateway(anyhow::anyhow!("store unavailable")));
        registry.finish_save(session.id, &failure).await;

        let state = registry.get(session.id).await.unwrap();
        assert_eq!(state.save_state, SaveState::Failed);
        assert_eq!(state.last_error.as_deref(), Some("store unavailable"));
        assert_eq!(state.tree, session.tree);
    }

    #[tokio::test]
    async fn test_idle_sessions_are_evicted_on_open() {
        let registry = SessionRegistry::new(Duration::ZERO);
        let first = registry.open(InstitutionId::new(), loaded()).await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        let second = registry.open(InstitutionId::new(), loaded()).await;

        assert!(registry.get(first.id).await.is_err());
        assert!(registry.get(second.id).await.is_ok());
        assert_eq!(registry.len().await, 1);
    }
}
