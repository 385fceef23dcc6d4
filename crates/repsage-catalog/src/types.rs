//! Catalog collaborator contract.

use async_trait::async_trait;
use repsage_core::{ExerciseRecord, MatchKind, Result};
use serde::{Deserialize, Serialize};

/// Which matching mode the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupMode {
    /// Literal match on the normalized name or an alias.
    Exact,
    /// Approximate match; the catalog reports how close it got.
    Fuzzy,
}

/// A catalog hit.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogMatch {
    pub record: ExerciseRecord,
    /// Catalog's own similarity score in [0, 1].
    pub confidence: f64,
    pub match_kind: MatchKind,
}

/// Catalog entry as stored in `catalog.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub record: ExerciseRecord,
    /// Alternative spellings that count as an exact match.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

/// Source of known exercises with demonstration visuals.
#[async_trait]
pub trait ExerciseCatalog: Send + Sync {
    /// Look up a name. `Ok(None)` is a plain miss; `Err` means the catalog
    /// itself could not answer.
    async fn lookup(&self, name: &str, mode: LookupMode) -> Result<Option<CatalogMatch>>;

    /// Number of exercises known, if the catalog can tell.
    fn size(&self) -> Option<usize> {
        None
    }
}
