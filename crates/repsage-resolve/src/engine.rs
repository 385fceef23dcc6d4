//! Resolution engine: runs the tier pipeline and owns its cache and metrics.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use repsage_catalog::ExerciseCatalog;
use repsage_core::{EngineConfig, MatchResult, ResolutionThresholds, Result, Tier};
use repsage_generate::GenerativeBackend;
use repsage_store::KeyValueStore;

use crate::metrics::{MetricsTracker, PerformanceMetrics};
use crate::semantic_cache::SemanticCache;
use crate::tiers::{self, TierContext};
use crate::types::{ResolveQuery, Resolution};

/// Maps free-text exercise names to exercise records.
///
/// Shared via `Arc`; concurrent resolutions are independent apart from the
/// semantic cache and the metrics counters.
pub struct ResolutionEngine {
    catalog: Arc<dyn ExerciseCatalog>,
    generator: Arc<dyn GenerativeBackend>,
    cache: SemanticCache,
    metrics: MetricsTracker,
    thresholds: ResolutionThresholds,
}

impl ResolutionEngine {
    /// Build an engine and load the persisted semantic cache.
    ///
    /// Fails only if `store` cannot be read.
    pub fn new(
        catalog: Arc<dyn ExerciseCatalog>,
        generator: Arc<dyn GenerativeBackend>,
        store: Arc<dyn KeyValueStore>,
        config: &EngineConfig,
    ) -> Result<Self> {
        let cache = SemanticCache::load(store, &config.semantic_cache)?;

        info!(
            "Resolution engine ready: generator={}, catalog_size={}, cached_queries={}",
            if generator.is_available() { "available" } else { "unavailable" },
            catalog
                .size()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unknown".into()),
            cache.len()
        );

        Ok(Self {
            catalog,
            generator,
            cache,
            metrics: MetricsTracker::new(),
            thresholds: config.thresholds,
        })
    }

    fn context(&self) -> TierContext<'_> {
        TierContext {
            catalog: self.catalog.as_ref(),
            generator: self.generator.as_ref(),
            cache: &self.cache,
            metrics: &self.metrics,
            thresholds: &self.thresholds,
        }
    }

    /// Resolve a free-text exercise name. Never fails: the generated tier
    /// accepts anything the earlier tiers pass on.
    pub async fn resolve_exercise(&self, name: &str) -> MatchResult {
        let started = Instant::now();
        let query = ResolveQuery::new(name);

        let (tier, resolution) = if query.is_empty() {
            debug!("Empty query, returning minimal record");
            (Tier::Generated, tiers::minimal(&query, &self.thresholds))
        } else {
            self.run_pipeline(&query).await
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        self.metrics.record(tier, elapsed_ms);

        let result = resolution.into_result(tier, elapsed_ms);
        info!(
            "Resolved '{}' via {} -> '{}' ({:.2}, {}ms)",
            query.normalized, tier, result.record.name, result.confidence, elapsed_ms
        );
        result
    }

    async fn run_pipeline(&self, query: &ResolveQuery) -> (Tier, Resolution) {
        let ctx = self.context();
        for tier in Tier::PIPELINE {
            if let Some(resolution) = run_tier(&ctx, tier, query).await {
                return (tier, resolution);
            }
            debug!("Tier {} passed on '{}'", tier, query.normalized);
        }
        (Tier::Generated, tiers::minimal(query, &self.thresholds))
    }

    /// Snapshot of the performance counters.
    pub fn metrics(&self) -> PerformanceMetrics {
        self.metrics.snapshot()
    }

    pub fn reset_metrics(&self) {
        self.metrics.reset();
        info!("Metrics reset");
    }

    /// Forget every learned query mapping, including the durable copy.
    pub fn clear_semantic_cache(&self) -> Result<()> {
        self.cache.clear()
    }

    pub fn semantic_cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn generator_available(&self) -> bool {
        self.generator.is_available()
    }

    pub fn catalog_size(&self) -> Option<usize> {
        self.catalog.size()
    }
}

async fn run_tier(ctx: &TierContext<'_>, tier: Tier, query: &ResolveQuery) -> Option<Resolution> {
    match tier {
        Tier::Exact => tiers::exact(ctx, query).await,
        Tier::Fuzzy => tiers::fuzzy(ctx, query).await,
        Tier::Semantic => tiers::semantic(ctx, query).await,
        Tier::Classification => tiers::classification(ctx, query).await,
        Tier::Generated => Some(tiers::generated(ctx, query).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic_cache::SEMANTIC_CACHE_KEY;
    use crate::testing::*;
    use repsage_catalog::StaticCatalog;
    use repsage_core::MatchKind;
    use repsage_generate::NoopBackend;
    use repsage_store::MemoryStore;

    fn engine(
        catalog: Arc<dyn ExerciseCatalog>,
        generator: Arc<dyn GenerativeBackend>,
        store: Arc<dyn KeyValueStore>,
    ) -> ResolutionEngine {
        ResolutionEngine::new(catalog, generator, store, &EngineConfig::default()).unwrap()
    }

    fn goblet_catalog() -> Arc<MapCatalog> {
        Arc::new(
            MapCatalog::new()
                .with("Goblet Squat", &["quads", "glutes"])
                .with("Squat", &["quads"]),
        )
    }

    #[tokio::test]
    async fn test_exact_push_up() {
        let generator = Arc::new(ScriptedBackend::new(None, None));
        let engine = engine(
            Arc::new(StaticCatalog::with_seed()),
            generator.clone(),
            Arc::new(MemoryStore::new()),
        );
        let result = engine.resolve_exercise("push up").await;
        assert_eq!(result.tier, Tier::Exact);
        assert_eq!(result.match_kind, MatchKind::Exact);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.record.name, "Push Up");
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_input_without_generator_is_low_confidence() {
        let engine = engine(
            Arc::new(MapCatalog::new()),
            Arc::new(NoopBackend),
            Arc::new(MemoryStore::new()),
        );
        let result = engine.resolve_exercise("some up push").await;
        assert_eq!(result.tier, Tier::Generated);
        assert_eq!(result.match_kind, MatchKind::Partial);
        assert!(result.confidence <= 0.4);
        assert_eq!(result.record.name, "Some Up Push");
        assert!(!result.record.instructions.is_empty());
    }

    #[tokio::test]
    async fn test_fuzzy_tier_respects_floor() {
        let catalog = Arc::new(
            MapCatalog::new()
                .with("Bench Press", &["chest"])
                .near("bench pres", "bench press", 0.9)
                .near("bnch", "bench press", 0.5),
        );
        let engine = engine(catalog, Arc::new(NoopBackend), Arc::new(MemoryStore::new()));

        let result = engine.resolve_exercise("Bench_Pres").await;
        assert_eq!(result.tier, Tier::Fuzzy);
        assert_eq!(result.match_kind, MatchKind::Fuzzy);
        assert!((result.confidence - 0.9).abs() < 1e-9);

        let result = engine.resolve_exercise("bnch").await;
        assert_ne!(result.tier, Tier::Fuzzy);
    }

    #[tokio::test]
    async fn test_semantic_cache_idempotence() {
        let generator = Arc::new(ScriptedBackend::alternatives(&[
            "Goblet Squat",
            "Front Squat",
            "Squat",
        ]));
        let store = Arc::new(CountingStore::default());
        let engine = engine(goblet_catalog(), generator.clone(), store.clone());

        let first = engine.resolve_exercise("dumbbell_goblet_squat").await;
        let second = engine.resolve_exercise("dumbbell_goblet_squat").await;

        assert_eq!(first.tier, Tier::Semantic);
        assert_eq!(second.tier, Tier::Semantic);
        assert_eq!(first.record.name, "Goblet Squat");
        assert!(second.confidence >= first.confidence);
        assert_eq!(generator.calls(), 1);
        assert_eq!(store.writes(), 1);

        let metrics = engine.metrics();
        assert_eq!(metrics.semantic_cache_misses, 1);
        assert_eq!(metrics.semantic_cache_hits, 1);
    }

    #[tokio::test]
    async fn test_semantic_winner_is_cached_first() {
        let catalog = Arc::new(
            MapCatalog::new()
                .with("Front Squat", &["quads"])
                .near("goblet squat", "front squat", 0.6),
        );
        let generator = Arc::new(ScriptedBackend::alternatives(&[
            "Goblet Squat",
            "Front Squat",
            "Squat",
        ]));
        let engine = engine(catalog, generator.clone(), Arc::new(MemoryStore::new()));

        let first = engine.resolve_exercise("db goblet thing").await;
        assert_eq!(first.tier, Tier::Semantic);
        assert_eq!(first.record.name, "Front Squat");
        assert!((first.confidence - 1.0).abs() < 1e-9);

        let cached = engine.cache.get("db goblet thing").unwrap();
        assert_eq!(cached.alternatives[0], "Front Squat");
        assert_eq!(cached.alternatives.len(), 3);

        let second = engine.resolve_exercise("db goblet thing").await;
        assert_eq!(second.tier, Tier::Semantic);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_semantic_boost_added_to_catalog_score() {
        let catalog = Arc::new(
            MapCatalog::new()
                .with("Hip Thrust", &["glutes"])
                .near("barbell glute lift", "hip thrust", 0.72),
        );
        let generator = Arc::new(ScriptedBackend::alternatives(&["Barbell Glute Lift"]));
        let engine = engine(catalog, generator, Arc::new(MemoryStore::new()));

        let result = engine.resolve_exercise("booty builder").await;
        assert_eq!(result.tier, Tier::Semantic);
        assert!((result.confidence - 0.82).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_failed_semantic_attempts_are_not_cached() {
        let generator = Arc::new(ScriptedBackend::alternatives(&["Unknown Move", "Other Move"]));
        let store = Arc::new(CountingStore::default());
        let engine = engine(goblet_catalog(), generator.clone(), store.clone());

        let result = engine.resolve_exercise("mystery flail").await;
        assert_ne!(result.tier, Tier::Semantic);
        assert_eq!(engine.semantic_cache_len(), 0);
        assert_eq!(store.writes(), 0);

        // A miss asks again next time
        engine.resolve_exercise("mystery flail").await;
        assert_eq!(engine.metrics().semantic_cache_misses, 2);
    }

    #[tokio::test]
    async fn test_malformed_alternatives_are_a_miss() {
        let generator = Arc::new(ScriptedBackend::new(
            Some(serde_json::json!({"names": ["Goblet Squat"]})),
            None,
        ));
        let store = Arc::new(CountingStore::default());
        let engine = engine(goblet_catalog(), generator, store.clone());

        let result = engine.resolve_exercise("dumbbell goblet squat").await;
        assert_eq!(result.tier, Tier::Classification);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_cache_survives_engine_restart() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        {
            let generator = Arc::new(ScriptedBackend::alternatives(&["Goblet Squat"]));
            let engine = engine(goblet_catalog(), generator, store.clone());
            engine.resolve_exercise("dumbbell_goblet_squat").await;
        }
        assert!(store.get(SEMANTIC_CACHE_KEY).unwrap().is_some());

        let generator = Arc::new(ScriptedBackend::new(None, None));
        let engine = engine(goblet_catalog(), generator.clone(), store);
        assert_eq!(engine.semantic_cache_len(), 1);

        let result = engine.resolve_exercise("Dumbbell Goblet Squat").await;
        assert_eq!(result.tier, Tier::Semantic);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_legacy_cache_entry_is_hit() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store
            .set(SEMANTIC_CACHE_KEY, r#"{"Dumbbell_Goblet_Squat": ["Goblet Squat"]}"#)
            .unwrap();
        let generator = Arc::new(ScriptedBackend::new(None, None));
        let engine = engine(goblet_catalog(), generator.clone(), store);

        let result = engine.resolve_exercise("dumbbell_goblet_squat").await;
        assert_eq!(result.tier, Tier::Semantic);
        assert_eq!(result.record.name, "Goblet Squat");
        assert_eq!(generator.calls(), 0);
        assert_eq!(engine.metrics().semantic_cache_hits, 1);
    }

    #[tokio::test]
    async fn test_stale_cache_hit_is_a_miss_without_generation() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store
            .set(SEMANTIC_CACHE_KEY, r#"{"dumbbell goblet squat": ["Retired Lift"]}"#)
            .unwrap();
        let generator = Arc::new(ScriptedBackend::alternatives(&["Goblet Squat"]));
        let engine = engine(goblet_catalog(), generator.clone(), store);

        let result = engine.resolve_exercise("dumbbell goblet squat").await;
        assert_ne!(result.tier, Tier::Semantic);
        assert_eq!(result.tier, Tier::Classification);
        assert_eq!(generator.calls(), 0);

        let metrics = engine.metrics();
        assert_eq!(metrics.semantic_cache_hits, 1);
        assert_eq!(metrics.semantic_cache_misses, 0);
    }

    #[tokio::test]
    async fn test_clear_semantic_cache() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let generator = Arc::new(ScriptedBackend::alternatives(&["Goblet Squat"]));
        let engine = engine(goblet_catalog(), generator.clone(), store.clone());
        engine.resolve_exercise("dumbbell goblet squat").await;
        assert_eq!(engine.semantic_cache_len(), 1);

        engine.clear_semantic_cache().unwrap();
        assert_eq!(engine.semantic_cache_len(), 0);
        assert!(store.get(SEMANTIC_CACHE_KEY).unwrap().is_none());

        engine.resolve_exercise("dumbbell goblet squat").await;
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_classification_determinism() {
        let engine = engine(
            goblet_catalog(),
            Arc::new(NoopBackend),
            Arc::new(MemoryStore::new()),
        );
        let result = engine.resolve_exercise("explosive_jump_squat").await;
        assert_eq!(result.tier, Tier::Classification);
        assert_eq!(result.match_kind, MatchKind::Partial);
        assert!((result.confidence - 0.6).abs() < 1e-9);
        assert_eq!(result.record.name, "Explosive Jump Squat (similar to Squat)");
        assert_eq!(result.record.id, "explosive-jump-squat");
        assert!(result.record.instructions[0].contains("Squat"));
        assert_eq!(result.record.instructions[1], "Perform the Squat.");
        assert!(result.record.visual_ref.is_some());
    }

    #[tokio::test]
    async fn test_generated_with_visual() {
        let generator = Arc::new(ScriptedBackend::new(
            Some(serde_json::json!({"alternatives": ["Nope"], "movementPattern": "other", "equipment": []})),
            Some(generated_exercise("Zercher Hold", &[], &["Nothing Here", "Goblet Squat"])),
        ));
        let engine = engine(goblet_catalog(), generator.clone(), Arc::new(MemoryStore::new()));

        let result = engine.resolve_exercise("zercher hold").await;
        assert_eq!(result.tier, Tier::Generated);
        assert_eq!(result.match_kind, MatchKind::Partial);
        assert!((result.confidence - 0.5).abs() < 1e-9);
        assert_eq!(result.record.name, "Zercher Hold");
        assert_eq!(result.record.visual_ref.as_deref(), Some("visuals/goblet-squat.gif"));
        // Borrowed from the visual's record
        assert_eq!(result.record.target_muscles, vec!["quads", "glutes"]);
        assert_eq!(result.record.equipment, vec!["dumbbell"]);
        assert_eq!(result.record.instructions.len(), 3);
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_generated_without_visual() {
        let generator = Arc::new(ScriptedBackend::new(
            None,
            Some(generated_exercise("Zercher Hold", &["biceps"], &["Nothing Here"])),
        ));
        let engine = engine(goblet_catalog(), generator, Arc::new(MemoryStore::new()));

        let result = engine.resolve_exercise("zercher hold").await;
        assert_eq!(result.tier, Tier::Generated);
        assert!((result.confidence - 0.4).abs() < 1e-9);
        assert!(result.record.visual_ref.is_none());
        assert_eq!(result.record.target_muscles, vec!["biceps"]);
        assert_eq!(result.record.equipment, vec!["bodyweight"]);
    }

    #[tokio::test]
    async fn test_packaging_failure_keeps_generated_content() {
        let mut catalog = MapCatalog::new().with("Goblet Squat", &["quads"]);
        catalog.fail_fuzzy = true;
        let generator = Arc::new(ScriptedBackend::new(
            None,
            Some(generated_exercise("Zercher Hold", &["biceps"], &["Goblet Squat"])),
        ));
        let engine = engine(Arc::new(catalog), generator, Arc::new(MemoryStore::new()));

        let result = engine.resolve_exercise("zercher hold").await;
        assert_eq!(result.tier, Tier::Generated);
        assert!((result.confidence - 0.4).abs() < 1e-9);
        assert!(result.record.visual_ref.is_none());
        assert_eq!(result.record.name, "Zercher Hold");
        assert_eq!(result.record.safety_tips, vec!["Go slow."]);
    }

    #[tokio::test]
    async fn test_degraded_uses_pattern_fallback() {
        // Query exact + fuzzy and both classification lookups fail; the
        // degraded path's lookup is the first to succeed.
        let mut catalog = MapCatalog::new().with("Squat", &["quads"]);
        catalog.fail_first = 4;
        let catalog = Arc::new(catalog);
        let engine = engine(catalog.clone(), Arc::new(NoopBackend), Arc::new(MemoryStore::new()));

        let result = engine.resolve_exercise("jump squat").await;
        assert_eq!(result.tier, Tier::Generated);
        assert_eq!(result.match_kind, MatchKind::Partial);
        assert!((result.confidence - 0.4).abs() < 1e-9);
        assert_eq!(result.record.name, "Jump Squat");
        assert_eq!(result.record.id, "jump-squat");
        assert_eq!(result.record.visual_ref.as_deref(), Some("visuals/squat.gif"));
        assert_eq!(result.record.target_muscles, vec!["quads"]);
        assert_eq!(result.record.equipment, vec!["dumbbell"]);
        assert_eq!(catalog.lookups.load(std::sync::atomic::Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_termination_on_odd_input() {
        let generator = Arc::new(ScriptedBackend::new(None, None));
        let engine = engine(
            Arc::new(StaticCatalog::with_seed()),
            generator.clone(),
            Arc::new(MemoryStore::new()),
        );

        let long = "lift ".repeat(5000);
        for input in ["", "   ", "_-_", "!!!@@@###", "💪💪💪", "1234567890", long.as_str()] {
            let result = engine.resolve_exercise(input).await;
            assert!((0.0..=1.0).contains(&result.confidence), "input {:?}", input);
            assert!(!result.record.instructions.is_empty());
            assert!(!result.record.target_muscles.is_empty());
            assert!(!result.record.equipment.is_empty());
            assert!(!result.record.id.is_empty());
        }
    }

    #[tokio::test]
    async fn test_empty_input_skips_collaborators() {
        let catalog = Arc::new(MapCatalog::new().with("Squat", &["quads"]));
        let generator = Arc::new(ScriptedBackend::alternatives(&["Squat"]));
        let engine = engine(catalog.clone(), generator.clone(), Arc::new(MemoryStore::new()));

        let result = engine.resolve_exercise("  \t ").await;
        assert_eq!(result.tier, Tier::Generated);
        assert!((result.confidence - 0.1).abs() < 1e-9);
        assert_eq!(result.record.name, "Exercise");
        assert_eq!(result.record.target_muscles, vec!["full body"]);
        assert_eq!(result.record.equipment, vec!["bodyweight"]);
        assert_eq!(generator.calls(), 0);
        assert_eq!(catalog.lookups.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert_eq!(engine.metrics().total_requests, 1);
    }

    #[tokio::test]
    async fn test_metrics_sum_to_total() {
        let engine = engine(
            goblet_catalog(),
            Arc::new(NoopBackend),
            Arc::new(MemoryStore::new()),
        );
        let inputs = ["squat", "goblet squat", "jump squat", "zzz", ""];
        for input in inputs {
            engine.resolve_exercise(input).await;
        }

        let metrics = engine.metrics();
        assert_eq!(metrics.total_requests, inputs.len() as u64);
        assert_eq!(metrics.tier_usage_counts.values().sum::<u64>(), inputs.len() as u64);
        assert_eq!(metrics.tier_usage_counts["exact"], 2);
        assert_eq!(metrics.tier_usage_counts["classification"], 1);
        assert_eq!(metrics.tier_usage_counts["generated"], 2);

        engine.reset_metrics();
        assert_eq!(engine.metrics().total_requests, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_metrics_under_concurrency() {
        let engine = Arc::new(engine(
            goblet_catalog(),
            Arc::new(ScriptedBackend::alternatives(&["Goblet Squat"])),
            Arc::new(MemoryStore::new()),
        ));

        let handles: Vec<_> = (0..40)
            .map(|i| {
                let engine = engine.clone();
                tokio::spawn(async move {
                    let name = match i % 4 {
                        0 => "squat",
                        1 => "dumbbell goblet squat",
                        2 => "explosive jump squat",
                        _ => "",
                    };
                    engine.resolve_exercise(name).await
                })
            })
            .collect();
        for handle in handles {
            let result = handle.await.unwrap();
            assert!(!result.record.instructions.is_empty());
        }

        let metrics = engine.metrics();
        assert_eq!(metrics.total_requests, 40);
        assert_eq!(metrics.tier_usage_counts.values().sum::<u64>(), 40);
        assert_eq!(engine.semantic_cache_len(), 1);
    }
}
