use anyhow::Result;
use std::sync::Arc;

use crate::recency::RecencyList;
use crate::storage::{KeyValueStore, MemoryStore, SqliteStore};
use crate::Config;

/// Application state shared by the front end: configuration and local state.
pub struct App {
    config: Config,
    store: Arc<dyn KeyValueStore>,
}

impl App {
    /// Load and validate configuration, then open the state database.
    ///
    /// If the state database cannot be opened the app falls back to an
    /// in-memory store so the dashboard still works without history.
    pub fn new() -> Result<Self> {
        let (config, _) = Config::load_validated()?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        let store = open_store(&config);
        Self { config, store }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn recency(&self) -> RecencyList {
        RecencyList::new(self.store.clone())
    }
}

fn open_store(config: &Config) -> Arc<dyn KeyValueStore> {
    if let Err(e) = std::fs::create_dir_all(&config.config_dir) {
        tracing::warn!("Cannot create {}: {}", config.config_dir.display(), e);
        return Arc::new(MemoryStore::new());
    }

    let path = config.state_db_path();
    match SqliteStore::open(&path) {
        Ok(store) => {
            tracing::debug!("Opened state database at {}", path.display());
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!("Falling back to in-memory state: {}", e);
            Arc::new(MemoryStore::new())
        }
    }
}
