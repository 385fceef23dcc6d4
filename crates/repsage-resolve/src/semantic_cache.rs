//! Persisted LRU cache of free-text query -> standard exercise names.
//!
//! The whole cache lives under one store key as a JSON object keyed by the
//! normalized query. Each write takes a snapshot under the cache lock and
//! stores it after releasing that lock; a snapshot older than the last one
//! stored is dropped. Default: 1000 entries, no TTL.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use repsage_core::{normalize, Result, SemanticCacheConfig};
use repsage_store::KeyValueStore;

/// Store key holding the serialized cache.
pub const SEMANTIC_CACHE_KEY: &str = "semantic_cache";

/// Coarse tags returned alongside the alternatives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticClassification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equipment: Vec<String>,
}

/// A remembered mapping. `alternatives[0]` is the name that resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticCacheEntry {
    pub query_key: String,
    pub alternatives: Vec<String>,
    pub classification: Option<SemanticClassification>,
    pub cached_at: DateTime<Utc>,
}

/// On-disk form of one entry.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    alternatives: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    classification: Option<SemanticClassification>,
    #[serde(default)]
    cached_at: Option<DateTime<Utc>>,
}

/// Either the object form or a bare alternatives list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PersistedEntry {
    Flat(Vec<String>),
    Full(StoredEntry),
}

/// Thread-safe semantic cache backed by a [`KeyValueStore`].
pub struct SemanticCache {
    inner: Mutex<CacheInner>,
    /// Version of the last snapshot written to the store.
    persisted: Mutex<u64>,
    store: Arc<dyn KeyValueStore>,
}

struct CacheInner {
    /// Bumped on every mutation that changes the durable copy.
    version: u64,
    entries: HashMap<String, SemanticCacheEntry>,
    /// Least recently used first.
    order: Vec<String>,
    max_entries: usize,
    ttl: Option<Duration>,
}

impl CacheInner {
    fn is_expired(&self, entry: &SemanticCacheEntry, now: DateTime<Utc>) -> bool {
        self.ttl.map_or(false, |ttl| now - entry.cached_at >= ttl)
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            let key = self.order.remove(pos);
            self.order.push(key);
        }
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.order.retain(|k| k != key);
    }

    fn evict_to(&mut self, capacity: usize) {
        while self.entries.len() > capacity && !self.order.is_empty() {
            let oldest = self.order.remove(0);
            self.entries.remove(&oldest);
        }
    }

    fn snapshot(&self) -> serde_json::Result<String> {
        let stored: BTreeMap<&str, StoredEntry> = self
            .entries
            .values()
            .map(|e| {
                (
                    e.query_key.as_str(),
                    StoredEntry {
                        alternatives: e.alternatives.clone(),
                        classification: e.classification.clone(),
                        cached_at: Some(e.cached_at),
                    },
                )
            })
            .collect();
        serde_json::to_string(&stored)
    }
}

impl SemanticCache {
    /// Load the persisted cache.
    ///
    /// A store that cannot be read is an error. Unparseable contents are
    /// logged and the cache starts empty.
    pub fn load(store: Arc<dyn KeyValueStore>, config: &SemanticCacheConfig) -> Result<Self> {
        let max_entries = config.max_entries.max(1);
        let ttl = config.ttl().and_then(|d| Duration::from_std(d).ok());
        let mut inner = CacheInner {
            version: 0,
            entries: HashMap::new(),
            order: Vec::new(),
            max_entries,
            ttl,
        };

        if let Some(raw) = store.get(SEMANTIC_CACHE_KEY)? {
            match serde_json::from_str::<HashMap<String, PersistedEntry>>(&raw) {
                Ok(persisted) => {
                    let now = Utc::now();
                    // Keys written by older versions may not be normalized;
                    // when two collapse together the newest wins.
                    let mut by_key: HashMap<String, SemanticCacheEntry> = HashMap::new();
                    for entry in persisted
                        .into_iter()
                        .filter_map(|(key, entry)| from_persisted(key, entry, now))
                        .filter(|e| !inner.is_expired(e, now))
                    {
                        match by_key.get(&entry.query_key) {
                            Some(kept) if kept.cached_at >= entry.cached_at => {}
                            _ => {
                                by_key.insert(entry.query_key.clone(), entry);
                            }
                        }
                    }
                    let mut loaded: Vec<SemanticCacheEntry> = by_key.into_values().collect();
                    // Oldest first so the most recent writes survive eviction.
                    loaded.sort_by(|a, b| {
                        a.cached_at
                            .cmp(&b.cached_at)
                            .then_with(|| a.query_key.cmp(&b.query_key))
                    });
                    for entry in loaded {
                        inner.order.push(entry.query_key.clone());
                        inner.entries.insert(entry.query_key.clone(), entry);
                    }
                    inner.evict_to(max_entries);
                    info!("Loaded {} semantic cache entries", inner.entries.len());
                }
                Err(e) => {
                    warn!("Semantic cache is corrupt, starting empty: {}", e);
                }
            }
        }

        Ok(Self {
            inner: Mutex::new(inner),
            persisted: Mutex::new(0),
            store,
        })
    }

    /// Cached entry for a normalized query. Expired entries count as a miss
    /// and are dropped.
    pub fn get(&self, query_key: &str) -> Option<SemanticCacheEntry> {
        let mut inner = self.inner.lock();
        let now = Utc::now();

        let expired = inner
            .entries
            .get(query_key)
            .map(|e| inner.is_expired(e, now));

        match expired {
            Some(false) => {
                inner.touch(query_key);
                inner.entries.get(query_key).cloned()
            }
            Some(true) => {
                debug!("Semantic cache entry for '{}' expired", query_key);
                inner.remove(query_key);
                None
            }
            None => None,
        }
    }

    /// Insert or replace an entry and persist the whole cache.
    ///
    /// The in-memory insert always happens; the returned error only reports
    /// that the durable copy could not be written.
    pub fn put(&self, entry: SemanticCacheEntry) -> Result<()> {
        let (version, snapshot) = {
            let mut inner = self.inner.lock();
            let key = entry.query_key.clone();

            inner.order.retain(|k| k != &key);
            inner.order.push(key.clone());
            inner.entries.insert(key, entry);
            let capacity = inner.max_entries;
            inner.evict_to(capacity);
            inner.version += 1;
            (inner.version, inner.snapshot()?)
        };

        let mut persisted = self.persisted.lock();
        if *persisted > version {
            debug!("Semantic cache snapshot v{} superseded by v{}", version, *persisted);
            return Ok(());
        }
        self.store.set(SEMANTIC_CACHE_KEY, &snapshot)?;
        *persisted = version;
        Ok(())
    }

    /// Drop every entry, in memory and in the store.
    pub fn clear(&self) -> Result<()> {
        let version = {
            let mut inner = self.inner.lock();
            inner.entries.clear();
            inner.order.clear();
            inner.version += 1;
            inner.version
        };

        let mut persisted = self.persisted.lock();
        if *persisted < version {
            self.store.remove(SEMANTIC_CACHE_KEY)?;
            *persisted = version;
        }
        info!("Semantic cache cleared");
        Ok(())
    }

    /// Number of entries in the cache.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn from_persisted(
    key: String,
    entry: PersistedEntry,
    now: DateTime<Utc>,
) -> Option<SemanticCacheEntry> {
    let (alternatives, classification, cached_at) = match entry {
        PersistedEntry::Flat(alternatives) => (alternatives, None, now),
        PersistedEntry::Full(stored) => (
            stored.alternatives,
            stored.classification,
            stored.cached_at.unwrap_or(now),
        ),
    };
    let alternatives: Vec<String> = alternatives
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    let query_key = normalize(&key);
    if query_key.is_empty() || alternatives.is_empty() {
        return None;
    }
    Some(SemanticCacheEntry {
        query_key,
        alternatives,
        classification,
        cached_at,
    })
}
