use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tower::ServiceExt;

use feedbackhub::router::init_router;
use feedbackhub::state::AppState;
use feedbackhub_config::{CorsConfig, HierarchyPolicy, ServerConfig};
use feedbackhub_db::{HierarchyStore, InMemoryStore, StoreError};
use feedbackhub_models::{
    ConfigDocument, DepartmentRecord, Institution, InstitutionId, NewDepartment,
};

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<FailingStore>,
}

/// Application wired to an in-memory store that can be told to fail.
pub fn test_app() -> TestApp {
    let store = Arc::new(FailingStore::default());
    let state = AppState::new(
        store.clone(),
        HierarchyPolicy::default(),
        CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
        ServerConfig::default(),
    );

    TestApp {
        router: init_router(state.clone()),
        state,
        store,
    }
}

/// Sends one request and decodes the JSON body (`Null` when empty).
pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(json) => Body::from(serde_json::to_string(&json).unwrap()),
            None => Body::empty(),
        })
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Opens an edit session for `institution_id` and returns its id.
#[allow(dead_code)]
pub async fn open_session(router: &Router, institution_id: InstitutionId) -> String {
    let (status, body) = send(
        router,
        "POST",
        &format!("/api/institutions/{}/hierarchy/sessions", institution_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

#[allow(dead_code)]
pub const STALL: Duration = Duration::from_millis(300);

/// [`InMemoryStore`] with switches for simulating document store failures.
#[derive(Default)]
pub struct FailingStore {
    pub inner: InMemoryStore,
    pub fail_upsert: AtomicBool,
    pub fail_list: AtomicBool,
    pub stall_next_upsert: AtomicBool,
    pub fail_create_for: std::sync::Mutex<HashSet<String>>,
}

#[allow(dead_code)]
impl FailingStore {
    pub fn fail_upserts(&self, fail: bool) {
        self.fail_upsert.store(fail, Ordering::SeqCst);
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    /// The next config write waits [`STALL`] before completing.
    pub fn stall_next_upsert(&self) {
        self.stall_next_upsert.store(true, Ordering::SeqCst);
    }

    pub fn fail_department(&self, name: &str) {
        self.fail_create_for.lock().unwrap().insert(name.to_string());
    }
}

#[async_trait]
impl HierarchyStore for FailingStore {
    async fn get_institution(&self, id: InstitutionId) -> Result<Option<Institution>, StoreError> {
        self.inner.get_institution(id).await
    }

    async fn upsert_institution(&self, institution: &Institution) -> Result<(), StoreError> {
        self.inner.upsert_institution(institution).await
    }

    async fn get_config(&self, id: InstitutionId) -> Result<Option<ConfigDocument>, StoreError> {
        self.inner.get_config(id).await
    }

    async fn upsert_config(
        &self,
        id: InstitutionId,
        document: &ConfigDocument,
    ) -> Result<(), StoreError> {
        if self.stall_next_upsert.swap(false, Ordering::SeqCst) {
            tokio::time::sleep(STALL).await;
        }
        if self.fail_upsert.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("config write refused".into()));
        }
        self.inner.upsert_config(id, document).await
    }

    async fn list_departments(
        &self,
        id: InstitutionId,
    ) -> Result<Vec<DepartmentRecord>, StoreError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("directory offline".into()));
        }
        self.inner.list_departments(id).await
    }

    async fn create_department(
        &self,
        new: &NewDepartment,
    ) -> Result<DepartmentRecord, StoreError> {
        if self.fail_create_for.lock().unwrap().contains(&new.name) {
            return Err(StoreError::Unavailable(format!("cannot create {}", new.name)));
        }
        self.inner.create_department(new).await
    }
}
