use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{Result, StencilError};
use crate::cache::ContentCache;
use crate::config::Config;
use crate::crawler::Crawler;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::store::SqliteStore;

pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub cache: ContentCache<SqliteStore>,
}

impl AppContext {
    /// Wire up the store, cache and fetcher. `db_path` overrides the
    /// configured database location.
    pub fn new(config: &Config, db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path.or_else(|| config.store.path.clone()) {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.fetcher)?);
        Self::with_parts(config, store, fetcher)
    }

    pub fn in_memory(config: &Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.fetcher)?);
        Self::with_parts(config, store, fetcher)
    }

    pub fn with_parts(
        config: &Config,
        store: Arc<SqliteStore>,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
    ) -> Result<Self> {
        let cache = ContentCache::new(store.clone(), config.endpoints.classifier()?);

        Ok(Self {
            store,
            fetcher,
            cache,
        })
    }

    pub fn crawler(&self) -> Crawler<'_, SqliteStore> {
        Crawler::new(&self.cache, self.fetcher.as_ref())
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| StencilError::Config("Could not find data directory".into()))?;
        let stencil_dir = data_dir.join("stencil");
        std::fs::create_dir_all(&stencil_dir)?;
        Ok(stencil_dir.join("stencil.db"))
    }
}
