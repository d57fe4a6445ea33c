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

//! Thread-safe cache of parsed XSD schemas, keyed by namespace
//!
//! The dialect schema is parsed once, on first request for
//! [`XML_NAMESPACE`](exprdoc_core::vocabulary::XML_NAMESPACE). Other schemas are
//! registered explicitly with [`SchemaCache::load`] or read from disk with
//! [`SchemaCache::get_or_load`].
//!
//! # Example
//!
//! ```rust
//! use exprdoc_xml::schema_cache::SchemaCache;
//! use exprdoc_core::vocabulary::XML_NAMESPACE;
//!
//! let cache = SchemaCache::new(10);
//! let schema = cache.get(XML_NAMESPACE)?.expect("bundled schema");
//! assert_eq!(schema.id(), XML_NAMESPACE);
//! assert_eq!(cache.size(), 1);
//! # Ok::<(), exprdoc_xml::XmlTransformError>(())
//! ```

use crate::error::XmlTransformError;
use crate::schema::XsdSchema;
use exprdoc_core::vocabulary as vocab;
use exprdoc_core::ValidationMode;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default number of schemas kept.
pub const DEFAULT_CACHE_CAPACITY: usize = 16;

static GLOBAL: Lazy<SchemaCache> = Lazy::new(|| SchemaCache::new(DEFAULT_CACHE_CAPACITY));

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
    /// Schemas parsed and inserted, including the bundled one
    pub loads: u64,
    pub evictions: u64,
    pub size: usize,
    pub capacity: usize,
}

#[derive(Debug)]
struct Inner {
    schemas: HashMap<String, Arc<XsdSchema>>,
    /// Namespaces from least to most recently used.
    order: Vec<String>,
    /// Namespace each loaded file declared.
    files: HashMap<PathBuf, String>,
    capacity: usize,
    stats: CacheStatistics,
}

impl Inner {
    fn touch(&mut self, id: &str) {
        if let Some(i) = self.order.iter().position(|k| k == id) {
            let key = self.order.remove(i);
            self.order.push(key);
        }
    }

    fn forget(&mut self, id: &str) -> bool {
        self.order.retain(|k| k != id);
        self.files.retain(|_, ns| ns != id);
        let removed = self.schemas.remove(id).is_some();
        self.stats.size = self.schemas.len();
        removed
    }
}

/// Thread-safe LRU cache of parsed schemas.
///
/// Uses a parking_lot `RwLock`; validation runs on the shared
/// `Arc<XsdSchema>` outside the lock.
#[derive(Debug, Clone)]
pub struct SchemaCache {
    inner: Arc<RwLock<Inner>>,
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl SchemaCache {
    /// Create a cache holding at most `capacity` schemas (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(RwLock::new(Inner {
                schemas: HashMap::with_capacity(capacity),
                order: Vec::with_capacity(capacity),
                files: HashMap::new(),
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

    /// Look up the schema for `namespace`, loading the bundled one on demand.
    pub fn get(&self, namespace: &str) -> Result<Option<Arc<XsdSchema>>, XmlTransformError> {
        {
            let mut inner = self.inner.write();
            if let Some(schema) = inner.schemas.get(namespace).cloned() {
                inner.touch(namespace);
                inner.stats.hits += 1;
                return Ok(Some(schema));
            }
            inner.stats.misses += 1;
        }
        if namespace != vocab::XML_NAMESPACE {
            return Ok(None);
        }
        let schema = XsdSchema::dialect()?;
        debug!(namespace, "loaded bundled schema");
        Ok(Some(self.insert(schema)))
    }

    /// Get the schema read from `path`, parsing the file on first use.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<XsdSchema>, XmlTransformError> {
        {
            let inner = self.inner.read();
            if let Some(schema) = inner
                .files
                .get(path)
                .and_then(|ns| inner.schemas.get(ns))
            {
                return Ok(Arc::clone(schema));
            }
        }
        let schema = match XsdSchema::from_file(path) {
            Ok(schema) => schema,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "rejected schema file");
                return Err(err);
            }
        };
        let id = schema.id().to_string();
        let schema = self.insert(schema);
        self.inner.write().files.insert(path.to_path_buf(), id);
        Ok(schema)
    }

    /// The schema that applies to a document under `mode`.
    ///
    /// A configured schema wins over the one the root namespace names.
    /// `Always` without any applicable schema is an error.
    pub fn select(
        &self,
        mode: ValidationMode,
        configured: Option<&Arc<XsdSchema>>,
        namespace: Option<&str>,
    ) -> Result<Option<Arc<XsdSchema>>, XmlTransformError> {
        if mode == ValidationMode::Never {
            return Ok(None);
        }
        if let Some(schema) = configured {
            return Ok(Some(Arc::clone(schema)));
        }
        let found = match namespace {
            Some(ns) => self.get(ns)?,
            None => None,
        };
        match (found, mode) {
            (None, ValidationMode::Always) => Err(XmlTransformError::MissingSchema {
                namespace: namespace.unwrap_or("").to_string(),
            }),
            (found, _) => Ok(found),
        }
    }

    /// Register `schema` under its namespace, replacing any previous entry.
    pub fn insert(&self, schema: XsdSchema) -> Arc<XsdSchema> {
        let schema = Arc::new(schema);
        let id = schema.id().to_string();
        let mut inner = self.inner.write();
        if !inner.schemas.contains_key(&id) && inner.schemas.len() >= inner.capacity {
            if let Some(oldest) = inner.order.first().cloned() {
                inner.forget(&oldest);
                inner.stats.evictions += 1;
                debug!(namespace = %oldest, "evicted schema");
            }
        }
        if inner.schemas.insert(id.clone(), Arc::clone(&schema)).is_some() {
            debug!(namespace = %id, "reloaded schema");
        } else {
            debug!(namespace = %id, "cached schema");
        }
        inner.order.retain(|k| k != &id);
        inner.order.push(id);
        inner.stats.loads += 1;
        inner.stats.size = inner.schemas.len();
        schema
    }

    /// Parse and register an XSD document.
    pub fn load(&self, xsd: &str) -> Result<Arc<XsdSchema>, XmlTransformError> {
        match XsdSchema::parse(xsd) {
            Ok(schema) => Ok(self.insert(schema)),
            Err(err) => {
                warn!(error = %err, "rejected schema");
                Err(err)
            }
        }
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.inner.read().schemas.contains_key(namespace)
    }

    /// Drop the schema cached for `namespace`.
    pub fn evict(&self, namespace: &str) -> bool {
        self.inner.write().forget(namespace)
    }

    pub fn statistics(&self) -> CacheStatistics {
        self.inner.read().stats.clone()
    }

    /// Clear all cached schemas and reset the counters.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.schemas.clear();
        inner.order.clear();
        inner.files.clear();
        let capacity = inner.capacity;
        inner.stats = CacheStatistics {
            capacity,
            ..Default::default()
        };
    }

    /// Get number of cached schemas.
    pub fn size(&self) -> usize {
        self.inner.read().schemas.len()
    }
}
