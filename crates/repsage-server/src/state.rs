//! Shared application state.

use std::sync::Arc;

use repsage_catalog::StaticCatalog;
use repsage_core::RepSageConfig;
use repsage_generate::{create_backend, LLMConfig};
use repsage_resolve::ResolutionEngine;
use repsage_store::SqliteStore;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: RepSageConfig,
    pub engine: ResolutionEngine,
}

impl AppState {
    pub fn new(config: RepSageConfig, engine: ResolutionEngine) -> Self {
        Self { config, engine }
    }

    /// Wire the engine to the on-disk catalog, SQLite store and configured
    /// LLM backend.
    pub fn open(config: RepSageConfig) -> anyhow::Result<Self> {
        let paths = &config.data_paths;

        let catalog = StaticCatalog::load_or_seed(&paths.catalog_file)
            .map_err(|e| anyhow::anyhow!("Failed to load catalog: {}", e))?;
        let store = SqliteStore::open(&paths.store)
            .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;
        let llm_config = LLMConfig::load(&paths.llm_config_file);
        let generator = create_backend(&llm_config);

        let engine = ResolutionEngine::new(
            Arc::new(catalog),
            generator,
            Arc::new(store),
            &config.engine,
        )
        .map_err(|e| anyhow::anyhow!("Failed to load semantic cache: {}", e))?;

        Ok(Self::new(config, engine))
    }
}
