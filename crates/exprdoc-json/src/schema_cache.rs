// exprdoc - Expression tree document serialization
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Schema cache keyed by schema id
//!
//! Parsed schemas are shared between conversions. The bundled dialect schema
//! is loaded on first request for its id; applications may register their
//! own schemas under other ids.
//!
//! # Thread Safety
//!
//! Queries (`contains`, `statistics`) take the read lock. `get` updates the
//! LRU counters and takes the write lock briefly, as do loading, replacing
//! and evicting. Validation runs on the shared `Arc<JsonSchema>` outside the
//! lock. A poisoned lock is recovered, since entries are only ever replaced
//! whole.

use crate::error::JsonTransformError;
use crate::schema::JsonSchema;
use exprdoc_core::vocabulary as vocab;
use exprdoc_core::ValidationMode;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;
use tracing::{debug, warn};

/// Default number of schemas kept.
pub const DEFAULT_CACHE_CAPACITY: usize = 16;

static GLOBAL: Lazy<SchemaCache> = Lazy::new(|| SchemaCache::new(DEFAULT_CACHE_CAPACITY));

#[derive(Debug, Clone)]
struct CacheEntry {
    schema: Arc<JsonSchema>,
    access_count: u64,
    last_access: Instant,
}

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStatistics {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups for ids that were not cached
    pub misses: u64,
    /// Schemas parsed and inserted, including the bundled one
    pub loads: u64,
    /// Entries dropped to make room
    pub evictions: u64,
    /// Current cache size
    pub size: usize,
    /// Maximum cache capacity
    pub capacity: usize,
}

impl CacheStatistics {
    /// Cache hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug)]
struct SchemaCacheInner {
    entries: HashMap<String, CacheEntry>,
    capacity: usize,
    stats: CacheStatistics,
}

/// Thread-safe LRU cache of parsed schemas
#[derive(Debug, Clone)]
pub struct SchemaCache {
    inner: Arc<RwLock<SchemaCacheInner>>,
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl SchemaCache {
    /// Create an empty cache holding at most `capacity` schemas (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(RwLock::new(SchemaCacheInner {
                entries: HashMap::with_capacity(capacity),
                capacity,
                stats: CacheStatistics {
                    capacity,
                    ..Default::default()
                },
            })),
        }
    }

    /// The process-wide cache used when a config names no schema.
    pub fn global() -> &'static SchemaCache {
        &GLOBAL
    }

    fn read(&self) -> RwLockReadGuard<'_, SchemaCacheInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SchemaCacheInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up the schema registered under `id`.
    ///
    /// The bundled dialect schema is loaded on first request.
    pub fn get(&self, id: &str) -> Result<Option<Arc<JsonSchema>>, JsonTransformError> {
        {
            let mut inner = self.write();
            if let Some(entry) = inner.entries.get_mut(id) {
                entry.access_count += 1;
                entry.last_access = Instant::now();
                let schema = entry.schema.clone();
                inner.stats.hits += 1;
                return Ok(Some(schema));
            }
            inner.stats.misses += 1;
        }
        if id != vocab::JSON_SCHEMA_ID {
            return Ok(None);
        }
        let schema = JsonSchema::dialect()?;
        debug!(schema = id, "loaded bundled schema");
        Ok(Some(self.insert(schema)))
    }

    /// The schema that applies to a document under `mode`.
    ///
    /// A configured schema wins over the one the document names in `$schema`.
    /// `Always` without any applicable schema is an error.
    pub fn select(
        &self,
        mode: ValidationMode,
        configured: Option<&Arc<JsonSchema>>,
        named: Option<&str>,
    ) -> Result<Option<Arc<JsonSchema>>, JsonTransformError> {
        if mode == ValidationMode::Never {
            return Ok(None);
        }
        if let Some(schema) = configured {
            return Ok(Some(schema.clone()));
        }
        let found = match named {
            Some(id) => self.get(id)?,
            None => None,
        };
        match (found, mode) {
            (None, ValidationMode::Always) => Err(JsonTransformError::MissingSchema(
                named.unwrap_or(vocab::JSON_SCHEMA_ID).to_string(),
            )),
            (found, _) => Ok(found),
        }
    }

    /// True when a schema is cached under `id`, without touching statistics.
    pub fn contains(&self, id: &str) -> bool {
        self.read().entries.contains_key(id)
    }

    /// Register `schema` under its id, replacing any previous entry.
    pub fn insert(&self, schema: JsonSchema) -> Arc<JsonSchema> {
        let schema = Arc::new(schema);
        let id = schema.id().to_string();
        let mut inner = self.write();
        if inner.entries.len() >= inner.capacity && !inner.entries.contains_key(&id) {
            if let Some(lru) = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| (entry.access_count, entry.last_access))
                .map(|(k, _)| k.clone())
            {
                inner.entries.remove(&lru);
                inner.stats.evictions += 1;
                debug!(schema = %lru, "evicted schema");
            }
        }
        let previous = inner.entries.insert(
            id.clone(),
            CacheEntry {
                schema: schema.clone(),
                access_count: 1,
                last_access: Instant::now(),
            },
        );
        if previous.is_some() {
            debug!(schema = %id, "reloaded schema");
        } else {
            debug!(schema = %id, "cached schema");
        }
        inner.stats.loads += 1;
        inner.stats.size = inner.entries.len();
        schema
    }

    /// Parse and register a schema document.
    pub fn load(&self, text: &str) -> Result<Arc<JsonSchema>, JsonTransformError> {
        match JsonSchema::parse(text) {
            Ok(schema) => Ok(self.insert(schema)),
            Err(err) => {
                warn!(error = %err, "rejected schema");
                Err(err)
            }
        }
    }

    /// Drop the schema cached under `id`.
    pub fn evict(&self, id: &str) -> bool {
        let mut inner = self.write();
        let removed = inner.entries.remove(id).is_some();
        if removed {
            inner.stats.size = inner.entries.len();
            debug!(schema = id, "evicted schema");
        }
        removed
    }

    /// Snapshot of the cache counters.
    pub fn statistics(&self) -> CacheStatistics {
        self.read().stats.clone()
    }

    /// Drop all schemas and reset the counters.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.entries.clear();
        let capacity = inner.capacity;
        inner.stats = CacheStatistics {
            capacity,
            ..Default::default()
        };
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.read().capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(id: &str) -> JsonSchema {
        JsonSchema::from_value(serde_json::json!({"$id": id, "type": "object"})).unwrap()
    }

    #[test]
    fn test_bundled_schema_loaded_on_demand() {
        let cache = SchemaCache::new(4);
        assert!(cache.is_empty());
        let first = cache.get(vocab::JSON_SCHEMA_ID).unwrap().unwrap();
        let second = cache.get(vocab::JSON_SCHEMA_ID).unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        let stats = cache.statistics();
        assert_eq!(stats.loads, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_unknown_id_is_none() {
        let cache = SchemaCache::new(4);
        assert!(cache.get("urn:unknown").unwrap().is_none());
        assert_eq!(cache.statistics().misses, 1);
    }

    #[test]
    fn test_insert_replaces_same_id() {
        let cache = SchemaCache::new(4);
        let a = cache.insert(schema("urn:a"));
        let b = cache.insert(schema("urn:a"));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.statistics().evictions, 0);
    }

    #[test]
    fn test_lru_eviction() {
        let cache = SchemaCache::new(2);
        cache.insert(schema("urn:a"));
        cache.insert(schema("urn:b"));
        cache.get("urn:a").unwrap();
        cache.insert(schema("urn:c"));
        assert!(cache.contains("urn:a"));
        assert!(!cache.contains("urn:b"));
        assert_eq!(cache.statistics().evictions, 1);
    }

    #[test]
    fn test_evict_and_clear() {
        let cache = SchemaCache::new(2);
        cache.insert(schema("urn:a"));
        assert!(cache.evict("urn:a"));
        assert!(!cache.evict("urn:a"));
        cache.insert(schema("urn:b"));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.statistics(), CacheStatistics { capacity: 2, ..Default::default() });
    }

    #[test]
    fn test_select_prefers_configured_schema() {
        let cache = SchemaCache::new(4);
        let configured = Arc::new(schema("urn:mine"));
        let chosen = cache
            .select(ValidationMode::IfSchemaPresent, Some(&configured), Some(vocab::JSON_SCHEMA_ID))
            .unwrap()
            .unwrap();
        assert_eq!(chosen.id(), "urn:mine");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_select_by_mode() {
        let cache = SchemaCache::new(4);
        assert!(cache
            .select(ValidationMode::Never, None, Some(vocab::JSON_SCHEMA_ID))
            .unwrap()
            .is_none());
        assert!(cache
            .select(ValidationMode::IfSchemaPresent, None, Some("urn:unknown"))
            .unwrap()
            .is_none());
        assert!(matches!(
            cache.select(ValidationMode::Always, None, None),
            Err(JsonTransformError::MissingSchema(_))
        ));
        assert!(cache
            .select(ValidationMode::Always, None, Some(vocab::JSON_SCHEMA_ID))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_load_rejects_invalid_text() {
        let cache = SchemaCache::new(2);
        assert!(cache.load("not json").is_err());
        assert!(cache.load(r#"{"$id": "urn:x"}"#).is_ok());
        assert!(cache.contains("urn:x"));
    }
}
