//! Application state

use quill_auth::{CredentialStore, SessionConfig, SessionManager};
use quill_core::PostRepository;
use quill_db::Database;

/// Prometheus handle used to render `/metrics`
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialStore,
    pub sessions: SessionManager,
    pub posts: PostRepository,
}

impl AppState {
    pub fn new(db: Database, session_config: SessionConfig) -> Self {
        Self {
            credentials: CredentialStore::new(db.clone()),
            sessions: SessionManager::new(db.clone(), session_config),
            posts: PostRepository::new(db),
        }
    }
}
