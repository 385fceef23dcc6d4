//! Collaborator doubles for tier and engine tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{json, Value};

use repsage_catalog::{CatalogMatch, ExerciseCatalog, LookupMode};
use repsage_core::{normalize, Error, ExerciseRecord, MatchKind, Result};
use repsage_generate::{GenerativeBackend, SchemaDescriptor};
use repsage_store::{KeyValueStore, MemoryStore};

/// Catalog backed by a map. Exact mode hits on the normalized name; fuzzy
/// mode also hits on explicitly registered near-misses.
#[derive(Default)]
pub struct MapCatalog {
    records: HashMap<String, ExerciseRecord>,
    near: HashMap<String, (String, f64)>,
    pub fail_fuzzy: bool,
    /// This many lookups fail before the catalog starts answering.
    pub fail_first: usize,
    pub lookups: AtomicUsize,
}

impl MapCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, muscles: &[&str]) -> Self {
        let mut record = ExerciseRecord::new(name);
        record.visual_ref = Some(format!("visuals/{}.gif", repsage_core::slug(name)));
        record.target_muscles = muscles.iter().map(|m| m.to_string()).collect();
        record.equipment = vec!["dumbbell".into()];
        record.instructions = vec![format!("Perform the {}.", name)];
        self.records.insert(normalize(name), record.finalize());
        self
    }

    /// Fuzzy lookups of `query` land on `target` at `confidence`.
    pub fn near(mut self, query: &str, target: &str, confidence: f64) -> Self {
        self.near
            .insert(normalize(query), (normalize(target), confidence));
        self
    }
}

#[async_trait]
impl ExerciseCatalog for MapCatalog {
    async fn lookup(&self, name: &str, mode: LookupMode) -> Result<Option<CatalogMatch>> {
        if self.lookups.fetch_add(1, Ordering::SeqCst) < self.fail_first {
            return Err(Error::Catalog("catalog warming up".into()));
        }
        let key = normalize(name);
        match mode {
            LookupMode::Exact => Ok(self.records.get(&key).map(|r| CatalogMatch {
                record: r.clone(),
                confidence: 1.0,
                match_kind: MatchKind::Exact,
            })),
            LookupMode::Fuzzy => {
                if self.fail_fuzzy {
                    return Err(Error::Catalog("fuzzy index offline".into()));
                }
                if let Some(r) = self.records.get(&key) {
                    return Ok(Some(CatalogMatch {
                        record: r.clone(),
                        confidence: 1.0,
                        match_kind: MatchKind::Fuzzy,
                    }));
                }
                Ok(self.near.get(&key).and_then(|(target, confidence)| {
                    self.records.get(target).map(|r| CatalogMatch {
                        record: r.clone(),
                        confidence: *confidence,
                        match_kind: MatchKind::Fuzzy,
                    })
                }))
            }
        }
    }

    fn size(&self) -> Option<usize> {
        Some(self.records.len())
    }
}

/// Generator with canned replies per schema; `None` makes that request fail.
pub struct ScriptedBackend {
    pub alternatives: Option<Value>,
    pub exercise: Option<Value>,
    pub available: bool,
    pub calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(alternatives: Option<Value>, exercise: Option<Value>) -> Self {
        Self {
            alternatives,
            exercise,
            available: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn alternatives(names: &[&str]) -> Self {
        Self::new(
            Some(json!({"alternatives": names, "movementPattern": "squat", "equipment": ["dumbbell"]})),
            None,
        )
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate(&self, _prompt: &str, schema: &SchemaDescriptor) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = match schema.name {
            "exercise_alternatives" => self.alternatives.clone(),
            _ => self.exercise.clone(),
        };
        reply.ok_or_else(|| Error::Generation(format!("scripted failure for {}", schema.name)))
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

/// A full `generated_exercise` reply.
pub fn generated_exercise(name: &str, target_muscles: &[&str], alternatives: &[&str]) -> Value {
    json!({
        "name": name,
        "description": format!("{} for testing.", name),
        "instructions": ["Brace.", "Move.", "Return."],
        "equipment": [],
        "targetMuscles": target_muscles,
        "secondaryMuscles": [],
        "safetyTips": ["Go slow."],
        "alternatives": alternatives,
    })
}

/// Memory store that counts writes.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    pub writes: AtomicUsize,
}

impl CountingStore {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for CountingStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        self.inner.remove(key)
    }
}
