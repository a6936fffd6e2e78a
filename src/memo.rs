//! Explicit memoization for the pure pipeline steps.
//!
//! Nothing here is global: a [`PipelineCache`] is owned by the session state
//! and handed to the pipeline, and a zero capacity turns caching off.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use crate::data::export::{self, ExportBlob, ExportFormat};
use crate::data::filter::{self, FilterSpec};
use crate::data::loader;
use crate::data::model::Dataset;
use crate::data::summary::{self, ColumnSummary};
use crate::error::{Result, SchemaError};

// ---------------------------------------------------------------------------
// Memo – a bounded map with least-recently-used eviction
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Memo<K: Hash + Eq, V> {
    /// `None` when the capacity is zero: every call recomputes.
    entries: Option<LruCache<K, V>>,
    hits: u64,
    misses: u64,
}

impl<K: Hash + Eq, V: Clone> Memo<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(LruCache::new),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    /// Errors are returned as-is and never cached.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: K,
        compute: impl FnOnce() -> std::result::Result<V, E>,
    ) -> std::result::Result<V, E> {
        if let Some(value) = self.lookup(&key) {
            return Ok(value);
        }
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Infallible variant of [`Memo::get_or_try_insert_with`].
    pub fn get_or_insert_with(&mut self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(value) = self.lookup(&key) {
            return value;
        }
        let value = compute();
        self.insert(key, value.clone());
        value
    }

    fn lookup(&mut self, key: &K) -> Option<V> {
        let found = self.entries.as_mut().and_then(|lru| lru.get(key).cloned());
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    fn insert(&mut self, key: K, value: V) {
        if let Some(lru) = self.entries.as_mut() {
            lru.put(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, LruCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

// ---------------------------------------------------------------------------
// Keys – content hash plus the shape, so a hash collision alone is not a hit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct DatasetKey {
    fingerprint: u64,
    rows: usize,
    columns: usize,
}

impl DatasetKey {
    fn of(dataset: &Dataset) -> Self {
        Self {
            fingerprint: dataset.fingerprint(),
            rows: dataset.len(),
            columns: dataset.columns().len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct LoadKey {
    fingerprint: u64,
    bytes: usize,
    delimiter: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FilterKey {
    dataset: DatasetKey,
    spec: u64,
    selections: usize,
}

// ---------------------------------------------------------------------------
// PipelineCache – one memo per pipeline step
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct PipelineCache {
    loads: Memo<LoadKey, Arc<Dataset>>,
    filters: Memo<FilterKey, Arc<Dataset>>,
    summaries: Memo<DatasetKey, Arc<Vec<ColumnSummary>>>,
    exports: Memo<(DatasetKey, ExportFormat), Arc<ExportBlob>>,
}

impl PipelineCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            loads: Memo::new(capacity),
            filters: Memo::new(capacity),
            summaries: Memo::new(capacity),
            exports: Memo::new(capacity),
        }
    }

    /// A cache that stores nothing; every call recomputes.
    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn load(&mut self, bytes: &[u8], delimiter: u8) -> Result<Arc<Dataset>> {
        let key = LoadKey {
            fingerprint: bytes_fingerprint(bytes),
            bytes: bytes.len(),
            delimiter,
        };
        self.loads
            .get_or_try_insert_with(key, || loader::load(bytes, delimiter).map(Arc::new))
    }

    pub fn filter(
        &mut self,
        dataset: &Arc<Dataset>,
        spec: &FilterSpec,
    ) -> std::result::Result<Arc<Dataset>, SchemaError> {
        let key = FilterKey {
            dataset: DatasetKey::of(dataset),
            spec: spec.fingerprint(),
            selections: spec.categories.len(),
        };
        self.filters
            .get_or_try_insert_with(key, || filter::filter(dataset, spec).map(Arc::new))
    }

    pub fn describe(&mut self, dataset: &Dataset) -> Arc<Vec<ColumnSummary>> {
        self.summaries
            .get_or_insert_with(DatasetKey::of(dataset), || Arc::new(summary::describe(dataset)))
    }

    pub fn export(&mut self, dataset: &Dataset, format: ExportFormat) -> Result<Arc<ExportBlob>> {
        self.exports
            .get_or_try_insert_with((DatasetKey::of(dataset), format), || {
                export::export(dataset, format).map(Arc::new)
            })
    }

    /// Total `(hits, misses)` over every step.
    pub fn stats(&self) -> (u64, u64) {
        [
            self.loads.stats(),
            self.filters.stats(),
            self.summaries.stats(),
            self.exports.stats(),
        ]
        .iter()
        .fold((0, 0), |(h, m), (sh, sm)| (h + sh, m + sm))
    }
}

impl Default for PipelineCache {
    fn default() -> Self {
        Self::new(8)
    }
}

fn bytes_fingerprint(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}
