//! The explicitly constructed application context.
//!
//! Opened once at process start, handed by reference to the ingestion runner
//! and the query operations (or cloned into the HTTP server state), and
//! closed on shutdown.

use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::store::{ArticleStore, InMemoryStore, SqliteStore};

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub store: Arc<dyn ArticleStore>,
}

impl AppContext {
    /// Open the store selected by `[db].backend`.
    pub async fn open(config: &Config) -> Result<Self> {
        let store: Arc<dyn ArticleStore> = if config.db.is_memory() {
            Arc::new(InMemoryStore::new())
        } else {
            Arc::new(SqliteStore::open(&config.db.path).await?)
        };
        Ok(Self::with_store(config.clone(), store))
    }

    pub fn with_store(config: Config, store: Arc<dyn ArticleStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    pub async fn close(&self) {
        self.store.close().await;
    }
}
