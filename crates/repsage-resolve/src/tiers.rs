//! The five resolution tiers.
//!
//! Each tier either accepts the query and returns a [`Resolution`] or returns
//! `None` so the engine moves on. Collaborator failures are logged and
//! treated as a miss; nothing here propagates an error.

use chrono::Utc;
use tracing::{debug, warn};

use repsage_catalog::{CatalogMatch, ExerciseCatalog, LookupMode};
use repsage_core::{slug, ExerciseRecord, MatchKind, ResolutionThresholds};
use repsage_generate::{suggest_alternatives, synthesize_exercise, GeneratedExercise, GenerativeBackend};

use crate::metrics::MetricsTracker;
use crate::patterns::{classify, PatternRule};
use crate::semantic_cache::{SemanticCache, SemanticCacheEntry, SemanticClassification};
use crate::types::{ResolveQuery, Resolution};

/// Everything a tier may touch during one resolution.
pub struct TierContext<'a> {
    pub catalog: &'a dyn ExerciseCatalog,
    pub generator: &'a dyn GenerativeBackend,
    pub cache: &'a SemanticCache,
    pub metrics: &'a MetricsTracker,
    pub thresholds: &'a ResolutionThresholds,
}

/// Catalog lookup with errors logged and folded into a miss.
async fn lookup(ctx: &TierContext<'_>, name: &str, mode: LookupMode) -> Option<CatalogMatch> {
    match ctx.catalog.lookup(name, mode).await {
        Ok(hit) => hit,
        Err(e) => {
            warn!("Catalog {:?} lookup for '{}' failed: {}", mode, name, e);
            None
        }
    }
}

/// Tier 1: literal catalog match, confidence as reported.
pub async fn exact(ctx: &TierContext<'_>, query: &ResolveQuery) -> Option<Resolution> {
    let hit = lookup(ctx, &query.normalized, LookupMode::Exact).await?;
    if hit.match_kind != MatchKind::Exact {
        debug!("Exact tier: catalog returned a {} match, ignoring", hit.match_kind);
        return None;
    }
    Some(Resolution::new(hit.record, hit.confidence, MatchKind::Exact))
}

/// Tier 2: approximate catalog match above the fuzzy floor.
pub async fn fuzzy(ctx: &TierContext<'_>, query: &ResolveQuery) -> Option<Resolution> {
    let hit = lookup(ctx, &query.normalized, LookupMode::Fuzzy).await?;
    if hit.confidence < ctx.thresholds.fuzzy_min {
        debug!(
            "Fuzzy tier: best '{}' at {:.3} is below {:.2}",
            hit.record.name, hit.confidence, ctx.thresholds.fuzzy_min
        );
        return None;
    }
    Some(Resolution::new(hit.record, hit.confidence, MatchKind::Fuzzy))
}

fn semantic_resolution(ctx: &TierContext<'_>, hit: CatalogMatch) -> Resolution {
    let confidence = (hit.confidence + ctx.thresholds.semantic_boost).min(1.0);
    Resolution::new(hit.record, confidence, MatchKind::Fuzzy)
}

/// Tier 3: generative alternatives resolved in the catalog, memoized in the
/// semantic cache.
pub async fn semantic(ctx: &TierContext<'_>, query: &ResolveQuery) -> Option<Resolution> {
    let floor = ctx.thresholds.semantic_min;

    if let Some(entry) = ctx.cache.get(&query.normalized) {
        ctx.metrics.record_cache_hit();
        let top = entry.alternatives.first()?;
        return match lookup(ctx, top, LookupMode::Fuzzy).await {
            Some(hit) if hit.confidence >= floor => {
                debug!("Semantic tier: cache hit '{}' -> '{}'", query.normalized, top);
                Some(semantic_resolution(ctx, hit))
            }
            _ => {
                debug!("Semantic tier: cached '{}' no longer resolves", top);
                None
            }
        };
    }
    ctx.metrics.record_cache_miss();

    if !ctx.generator.is_available() {
        debug!("Semantic tier: no generator available");
        return None;
    }

    let response = match suggest_alternatives(ctx.generator, &query.normalized).await {
        Ok(r) => r,
        Err(e) => {
            warn!("Semantic tier: alternatives for '{}' failed: {}", query.normalized, e);
            return None;
        }
    };

    for (i, alternative) in response.alternatives.iter().enumerate() {
        let Some(hit) = lookup(ctx, alternative, LookupMode::Fuzzy).await else {
            continue;
        };
        if hit.confidence < floor {
            debug!(
                "Semantic tier: '{}' -> '{}' at {:.3}, below {:.2}",
                alternative, hit.record.name, hit.confidence, floor
            );
            continue;
        }

        let mut alternatives = response.alternatives.clone();
        let winner = alternatives.remove(i);
        alternatives.insert(0, winner);
        let entry = SemanticCacheEntry {
            query_key: query.normalized.clone(),
            alternatives,
            classification: Some(SemanticClassification {
                movement_pattern: response.movement_pattern.clone(),
                equipment: response.equipment.clone(),
            }),
            cached_at: Utc::now(),
        };
        if let Err(e) = ctx.cache.put(entry) {
            warn!("Semantic cache write failed: {}", e);
        }

        debug!(
            "Semantic tier: '{}' -> '{}' ({})",
            query.normalized, alternative, hit.record.name
        );
        return Some(semantic_resolution(ctx, hit));
    }

    debug!("Semantic tier: no alternative for '{}' cleared {:.2}", query.normalized, floor);
    None
}

/// Fallback exercise for a rule: exact first, then approximate above the
/// fuzzy floor.
async fn resolve_fallback(ctx: &TierContext<'_>, rule: &PatternRule) -> Option<CatalogMatch> {
    let name = rule.fallback_exercise_name;
    if let Some(hit) = lookup(ctx, name, LookupMode::Exact).await {
        return Some(hit);
    }
    lookup(ctx, name, LookupMode::Fuzzy)
        .await
        .filter(|hit| hit.confidence >= ctx.thresholds.fuzzy_min)
}

/// Tier 4: movement-pattern keyword rule, substituting a representative
/// catalog exercise.
pub async fn classification(ctx: &TierContext<'_>, query: &ResolveQuery) -> Option<Resolution> {
    let rule = classify(&query.normalized)?;
    let Some(hit) = resolve_fallback(ctx, rule).await else {
        debug!(
            "Classification tier: fallback '{}' not in catalog",
            rule.fallback_exercise_name
        );
        return None;
    };

    let display = query.display();
    let mut record = hit.record;
    let substitute = record.name.clone();
    record.instructions.insert(
        0,
        format!(
            "No demonstration exists for {}; this shows {}, a similar {} movement. \
             Follow the same form and adjust the range of motion to fit.",
            display, substitute, rule.classification.movement
        ),
    );
    record.name = format!("{} (similar to {})", display, substitute);
    record.id = slug(&query.normalized);

    debug!(
        "Classification tier: '{}' -> {} rule, fallback '{}'",
        query.normalized, rule.classification.movement, substitute
    );
    Some(Resolution::new(
        record,
        ctx.thresholds.classification,
        MatchKind::Partial,
    ))
}

/// Record used for empty input: generic defaults only.
pub fn minimal(query: &ResolveQuery, thresholds: &ResolutionThresholds) -> Resolution {
    let mut record = ExerciseRecord::minimal(query.display());
    record.id = slug(&query.normalized);
    Resolution::new(record, thresholds.generated_minimal, MatchKind::Partial)
}

/// Tier 5: synthesized content. Always accepts.
pub async fn generated(ctx: &TierContext<'_>, query: &ResolveQuery) -> Resolution {
    let generated = if ctx.generator.is_available() {
        match synthesize_exercise(ctx.generator, &query.normalized).await {
            Ok(g) => Some(g),
            Err(e) => {
                warn!("Generated tier: synthesis for '{}' failed: {}", query.normalized, e);
                None
            }
        }
    } else {
        None
    };

    match generated {
        Some(g) => package_generated(ctx, query, g).await,
        None => degraded(ctx, query).await,
    }
}

/// Visual source for generated content: the first alternative that resolves
/// above the semantic floor, else the pattern fallback. A catalog error is
/// returned rather than skipped.
async fn find_visual(
    ctx: &TierContext<'_>,
    query: &ResolveQuery,
    alternatives: &[String],
) -> repsage_core::Result<Option<CatalogMatch>> {
    for alternative in alternatives {
        if let Some(hit) = ctx.catalog.lookup(alternative, LookupMode::Fuzzy).await? {
            if hit.confidence >= ctx.thresholds.semantic_min {
                return Ok(Some(hit));
            }
        }
    }
    if let Some(rule) = classify(&query.normalized) {
        return ctx
            .catalog
            .lookup(rule.fallback_exercise_name, LookupMode::Exact)
            .await;
    }
    Ok(None)
}

async fn package_generated(
    ctx: &TierContext<'_>,
    query: &ResolveQuery,
    generated: GeneratedExercise,
) -> Resolution {
    let mut record = ExerciseRecord::new(generated.name);
    record.id = slug(&query.normalized);
    record.description = Some(generated.description).filter(|d| !d.trim().is_empty());
    record.instructions = generated.instructions;
    record.equipment = generated.equipment;
    record.target_muscles = generated.target_muscles;
    record.secondary_muscles = generated.secondary_muscles;
    record.safety_tips = generated.safety_tips;

    let thresholds = ctx.thresholds;
    match find_visual(ctx, query, &generated.alternatives).await {
        Ok(Some(visual)) => {
            let source = visual.record;
            record.visual_ref = source.visual_ref;
            if record.target_muscles.is_empty() {
                record.target_muscles = source.target_muscles;
                record.secondary_muscles = source.secondary_muscles;
            }
            if record.equipment.is_empty() {
                record.equipment = source.equipment;
            }
            let confidence = if record.visual_ref.is_some() {
                thresholds.generated_with_visual
            } else {
                thresholds.generated_without_visual
            };
            debug!("Generated tier: '{}' packaged with visual from '{}'", query.normalized, source.name);
            Resolution::new(record.finalize(), confidence, MatchKind::Partial)
        }
        Ok(None) => {
            debug!("Generated tier: '{}' has no visual", query.normalized);
            Resolution::new(
                record.finalize(),
                thresholds.generated_without_visual,
                MatchKind::Partial,
            )
        }
        Err(e) => {
            warn!("Generated tier: attaching a visual for '{}' failed: {}", query.normalized, e);
            Resolution::new(
                record.finalize(),
                thresholds.generated_degraded,
                MatchKind::Partial,
            )
        }
    }
}

/// Generation failed: minimal record, enriched by the pattern fallback when
/// one resolves.
async fn degraded(ctx: &TierContext<'_>, query: &ResolveQuery) -> Resolution {
    let mut resolution = minimal(query, ctx.thresholds);

    let Some(rule) = classify(&query.normalized) else {
        return resolution;
    };
    let Some(hit) = lookup(ctx, rule.fallback_exercise_name, LookupMode::Exact).await else {
        return resolution;
    };

    let source = hit.record;
    let mut record = ExerciseRecord::new(query.display());
    record.id = slug(&query.normalized);
    record.visual_ref = source.visual_ref;
    record.target_muscles = source.target_muscles;
    record.secondary_muscles = source.secondary_muscles;
    record.equipment = source.equipment;
    resolution.record = record.finalize();
    resolution.confidence = ctx.thresholds.generated_degraded;
    debug!(
        "Generated tier: '{}' degraded to {} pattern data",
        query.normalized, rule.classification.movement
    );
    resolution
}
