//! RepSage Core: exercise records, name normalization, configuration, errors.

pub mod body_parts;
pub mod config;
pub mod error;
pub mod name;
pub mod types;

pub use config::{DataPaths, EngineConfig, RepSageConfig, ResolutionThresholds, SemanticCacheConfig};
pub use error::{Error, Result};
pub use name::{display_name, normalize, slug};
pub use types::*;
