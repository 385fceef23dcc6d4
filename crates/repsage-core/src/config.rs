//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Paths to all RepSage data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Durable key-value store directory (`data/store/`).
    pub store: PathBuf,
    /// Exercise catalog (`data/catalog.json`).
    pub catalog_file: PathBuf,
    /// LLM configuration (`data/llm-config.json`).
    pub llm_config_file: PathBuf,
    /// Resolution thresholds and cache policy (`data/engine.json`).
    pub engine_config_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            store: root.join("store"),
            catalog_file: root.join("catalog.json"),
            llm_config_file: root.join("llm-config.json"),
            engine_config_file: root.join("engine.json"),
            root,
        };
        std::fs::create_dir_all(&paths.store)?;
        Ok(paths)
    }
}

/// Acceptance floors and confidence constants for each tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionThresholds {
    /// Minimum catalog confidence for the fuzzy tier.
    pub fuzzy_min: f64,
    /// Minimum catalog confidence for a semantic alternative.
    pub semantic_min: f64,
    /// Added to an accepted semantic match, capped at 1.0.
    pub semantic_boost: f64,
    /// Fixed confidence of a classification-tier result.
    pub classification: f64,
    /// Generated content with an attached visual.
    pub generated_with_visual: f64,
    /// Generated content without a visual.
    pub generated_without_visual: f64,
    /// Generation succeeded but attaching the visual failed, or generation
    /// failed and a pattern fallback exercise supplied the data.
    pub generated_degraded: f64,
    /// Nothing contributed: minimal synthetic record.
    pub generated_minimal: f64,
}

impl Default for ResolutionThresholds {
    fn default() -> Self {
        Self {
            fuzzy_min: 0.75,
            semantic_min: 0.70,
            semantic_boost: 0.10,
            classification: 0.6,
            generated_with_visual: 0.5,
            generated_without_visual: 0.4,
            generated_degraded: 0.4,
            generated_minimal: 0.1,
        }
    }
}

/// Eviction policy for the semantic cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticCacheConfig {
    /// LRU capacity.
    pub max_entries: usize,
    /// Entry lifetime in seconds; `None` keeps entries until evicted.
    pub ttl_secs: Option<u64>,
}

impl SemanticCacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

impl Default for SemanticCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            ttl_secs: None,
        }
    }
}

/// Everything the resolution engine needs besides its collaborators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub thresholds: ResolutionThresholds,
    pub semantic_cache: SemanticCacheConfig,
}

impl EngineConfig {
    /// Load from a JSON file, falling back to defaults for a missing file or
    /// missing fields. A file that exists but does not parse is an error.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(raw) => {
                let config: EngineConfig = serde_json::from_str(&raw).map_err(|e| {
                    crate::Error::Config(format!("{}: {}", path.display(), e))
                })?;
                info!("Loaded engine config from {}", path.display());
                config
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e.into()),
        };
        config.apply_env();
        Ok(config)
    }

    /// Env overrides for the cache policy.
    fn apply_env(&mut self) {
        if let Some(max) = env_parse::<usize>("REPSAGE_CACHE_MAX_ENTRIES") {
            self.semantic_cache.max_entries = max;
        }
        if let Some(ttl) = env_parse::<u64>("REPSAGE_CACHE_TTL_SECS") {
            self.semantic_cache.ttl_secs = if ttl == 0 { None } else { Some(ttl) };
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {}={}: not a valid value", key, raw);
            None
        }
    }
}

/// Top-level RepSage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepSageConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    pub engine: EngineConfig,
}

impl RepSageConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> crate::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3010);

        let data_paths = DataPaths::new(data_dir)?;
        let engine = EngineConfig::load(&data_paths.engine_config_file)?;

        Ok(Self {
            port,
            data_paths,
            engine,
        })
    }
}
