//! RepSage Resolve: the tiered exercise resolution pipeline.
//!
//! Tiers, in order: exact catalog match, fuzzy catalog match, semantic
//! alternatives (memoized in a persisted cache), movement-pattern
//! classification, and generated content. [`ResolutionEngine`] runs them and
//! always produces a [`repsage_core::MatchResult`].

pub mod engine;
pub mod metrics;
pub mod patterns;
pub mod semantic_cache;
pub mod tiers;
pub mod types;

#[cfg(test)]
mod testing;

pub use engine::ResolutionEngine;
pub use metrics::{MetricsTracker, PerformanceMetrics};
pub use patterns::{classify, MovementPattern, PatternRule, PATTERN_RULES};
pub use semantic_cache::{SemanticCache, SemanticCacheEntry, SemanticClassification};
pub use types::*;
