//! Application state management.
//!
//! Holds the document store and the services built on it. Every service
//! shares the same store handle.

use std::sync::Arc;
use tracing::info;

use crate::config::{AppConfig, EditorConfig, StoreBackend};
use crate::services::jwt_service::SharedJwtService;
use crate::services::{
    InvitationService, JwtService, ModelService, ProjectAggregation, ProjectService, UserService,
};
use crate::storage::{DocumentStore, FileStore, MemoryStore, RtdbStore, StorageError};

/// Application state shared across all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub jwt: SharedJwtService,
    pub users: UserService,
    pub projects: ProjectService,
    pub models: ModelService,
    pub invitations: InvitationService,
    pub aggregation: ProjectAggregation,
    pub editor: EditorConfig,
}

impl AppState {
    pub fn new(config: &AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            jwt: Arc::new(JwtService::from_config(config)),
            users: UserService::new(store.clone()),
            projects: ProjectService::new(store.clone()),
            models: ModelService::new(store.clone()),
            invitations: InvitationService::new(store.clone()),
            aggregation: ProjectAggregation::new(store.clone()),
            editor: config.editor.clone(),
            store,
        }
    }

    /// Open the configured store backend and build the state on it.
    pub async fn from_config(config: &AppConfig) -> Result<Self, StorageError> {
        let store = open_store(&config.store).await?;
        info!("Using {} document store", store.backend_name());
        Ok(Self::new(config, store))
    }
}

pub async fn open_store(backend: &StoreBackend) -> Result<Arc<dyn DocumentStore>, StorageError> {
    let store: Arc<dyn DocumentStore> = match backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File { path } => Arc::new(FileStore::open(path).await?),
        StoreBackend::Rtdb { url, auth } => Arc::new(RtdbStore::new(url, auth.clone())?),
    };
    Ok(store)
}
