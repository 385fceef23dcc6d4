//! In-memory catalog with exact and approximate name matching.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use repsage_core::{normalize, Error, MatchKind, Result};
use tracing::{debug, info};

use crate::seed::seed_entries;
use crate::types::{CatalogEntry, CatalogMatch, ExerciseCatalog, LookupMode};

/// Catalog held entirely in memory.
pub struct StaticCatalog {
    entries: Vec<CatalogEntry>,
    /// Normalized name or alias → entry index.
    index: HashMap<String, usize>,
}

impl StaticCatalog {
    /// Build from entries. Records are finalized; later duplicates of a
    /// normalized name or alias lose to earlier ones.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let entries: Vec<CatalogEntry> = entries
            .into_iter()
            .map(|e| CatalogEntry {
                record: e.record.finalize(),
                aliases: e.aliases,
            })
            .collect();

        let mut index = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            for key in std::iter::once(&entry.record.name).chain(entry.aliases.iter()) {
                let key = normalize(key);
                if !key.is_empty() {
                    index.entry(key).or_insert(i);
                }
            }
        }

        Self { entries, index }
    }

    /// The built-in seed list: one representative exercise per movement
    /// pattern plus common staples.
    pub fn with_seed() -> Self {
        Self::new(seed_entries())
    }

    /// Load a JSON array of [`CatalogEntry`] from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Catalog(format!("{}: {}", path.display(), e)))?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&raw)
            .map_err(|e| Error::Catalog(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::new(entries);
        info!(
            "Loaded catalog: {} exercises from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Load from `path` when it exists, otherwise fall back to the seed list.
    pub fn load_or_seed(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            info!(
                "No catalog at {}, using built-in seed catalog",
                path.display()
            );
            Ok(Self::with_seed())
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn exact(&self, key: &str) -> Option<CatalogMatch> {
        self.index.get(key).map(|&i| CatalogMatch {
            record: self.entries[i].record.clone(),
            confidence: 1.0,
            match_kind: MatchKind::Exact,
        })
    }

    fn closest(&self, key: &str) -> Option<CatalogMatch> {
        let (best_idx, best_score) = self
            .index
            .iter()
            .map(|(candidate, &i)| (i, similarity(key, candidate)))
            .fold(None, |best: Option<(usize, f64)>, (i, score)| match best {
                Some((bi, bs)) if bs > score || (bs == score && bi <= i) => Some((bi, bs)),
                _ => Some((i, score)),
            })?;

        debug!(
            "Closest catalog entry for '{}': '{}' ({:.3})",
            key, self.entries[best_idx].record.name, best_score
        );

        Some(CatalogMatch {
            record: self.entries[best_idx].record.clone(),
            confidence: best_score,
            match_kind: MatchKind::Fuzzy,
        })
    }
}

/// Similarity in [0, 1]: the better of edit-distance and bigram overlap, so
/// both typos and reordered words score reasonably.
fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b).max(strsim::sorensen_dice(a, b))
}

#[async_trait]
impl ExerciseCatalog for StaticCatalog {
    async fn lookup(&self, name: &str, mode: LookupMode) -> Result<Option<CatalogMatch>> {
        let key = normalize(name);
        if key.is_empty() {
            return Ok(None);
        }
        if let Some(hit) = self.exact(&key) {
            return Ok(Some(hit));
        }
        match mode {
            LookupMode::Exact => Ok(None),
            LookupMode::Fuzzy => Ok(self.closest(&key)),
        }
    }

    fn size(&self) -> Option<usize> {
        Some(self.len())
    }
}
