use std::sync::Arc;

use crate::api::{BugTrackerApi, HttpApi};
use crate::auth::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::auth::store::SessionStore;
use crate::bugs::store::BugStore;
use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Everything a command needs: the API client plus the session and bug
/// stores it mutates.
pub struct AppState {
    pub config: Config,
    pub api: Arc<dyn BugTrackerApi>,
    pub session: SessionStore,
    pub bugs: BugStore,
}

impl AppState {
    pub fn new(config: Config, api: Arc<dyn BugTrackerApi>, storage: Box<dyn KeyValueStore>) -> Self {
        Self {
            config,
            api,
            session: SessionStore::restore(storage),
            bugs: BugStore::new(),
        }
    }

    /// Wire up the HTTP client and on-disk session named by `config`.
    pub fn from_config(config: Config, ephemeral: bool) -> AppResult<Self> {
        let api = HttpApi::new(&config.api.base_url)
            .map_err(|e| AppError::Config(format!("api.base_url: {}", e)))?;
        let storage: Box<dyn KeyValueStore> = if ephemeral {
            Box::new(MemoryStore::new())
        } else {
            Box::new(FileStore::open(config.session_path())?)
        };
        tracing::debug!(api = %api.base_url(), ephemeral, "Initialized state");
        Ok(Self::new(config, Arc::new(api), storage))
    }
}
