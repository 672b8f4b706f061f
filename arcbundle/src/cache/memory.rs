//! In-memory cache of loaded bundles with LRU eviction.
//!
//! Holds at most `capacity` [`BundleBuffer`]s and always keeps the most
//! recently touched ones. Recency is tracked by an O(1) LRU list
//! (`lru::LruCache`) instead of re-sorting entries on every insertion.
//!
//! # Locking
//!
//! The LRU map sits behind one mutex that is only held for lookups and
//! inserts, never across file reads. Misses take a per-id load lock
//! first, so concurrent requests for a bundle that is not yet resident
//! trigger exactly one load and every caller receives the same `Arc`,
//! while hits on other bundles proceed during the load. A failed load
//! inserts nothing, so the next request retries it.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::bundle::{BundleBuffer, BundleDescriptor, BundleError};

use super::traits::{BundleLoader, FsBundleLoader};

/// Default number of bundles kept in memory.
pub const DEFAULT_CAPACITY: usize = 20;

/// Counters describing cache behaviour since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Successful loads from the loader.
    pub loads: u64,
    /// Loads that returned an error.
    pub load_failures: u64,
    pub evictions: u64,
    /// Bundles currently resident.
    pub entries: usize,
}

struct CachedBundle {
    buffer: Arc<BundleBuffer>,
    last_accessed: Instant,
}

/// Capacity-bounded, recency-ordered cache of loaded bundles keyed by
/// bundle id.
pub struct BundleCache {
    entries: Mutex<LruCache<String, CachedBundle>>,
    /// Per-id locks for bundles currently being loaded.
    loading: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    loader: Arc<dyn BundleLoader>,
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
    load_failures: AtomicU64,
    evictions: AtomicU64,
}

impl BundleCache {
    /// Create a cache that reads bundles from disk.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self::with_loader(capacity, Arc::new(FsBundleLoader))
    }

    /// Create a cache with a custom loader.
    pub fn with_loader(capacity: usize, loader: Arc<dyn BundleLoader>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            loading: Mutex::new(HashMap::new()),
            loader,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            loads: AtomicU64::new(0),
            load_failures: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// The bundle for `descriptor`, loading it on first access.
    ///
    /// A hit refreshes the entry's recency. A miss reads both files through
    /// the loader under the id's load lock, inserts the result and evicts
    /// the least recently used entry if capacity is exceeded.
    pub fn get(&self, descriptor: &BundleDescriptor) -> Result<Arc<BundleBuffer>, BundleError> {
        if let Some(buffer) = self.lookup(&descriptor.id) {
            return Ok(buffer);
        }

        let gate = Arc::clone(
            self.loading
                .lock()
                .entry(descriptor.id.clone())
                .or_default(),
        );
        let _loading = gate.lock();

        // Another caller may have finished the load while we waited.
        if let Some(buffer) = self.lookup(&descriptor.id) {
            self.release_gate(&descriptor.id, &gate);
            return Ok(buffer);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let result = self.load_and_insert(descriptor);
        self.release_gate(&descriptor.id, &gate);
        result
    }

    fn lookup(&self, id: &str) -> Option<Arc<BundleBuffer>> {
        let mut entries = self.entries.lock();
        let entry = entries.get_mut(id)?;
        entry.last_accessed = Instant::now();
        self.hits.fetch_add(1, Ordering::Relaxed);
        trace!(bundle = %id, "Bundle cache hit");
        Some(Arc::clone(&entry.buffer))
    }

    fn load_and_insert(
        &self,
        descriptor: &BundleDescriptor,
    ) -> Result<Arc<BundleBuffer>, BundleError> {
        let buffer = match self.loader.load(descriptor) {
            Ok(buffer) => Arc::new(buffer),
            Err(e) => {
                self.load_failures.fetch_add(1, Ordering::Relaxed);
                if !e.is_not_found() {
                    warn!(bundle = %descriptor.id, error = %e, "Failed to load bundle");
                }
                return Err(e);
            }
        };
        self.loads.fetch_add(1, Ordering::Relaxed);

        debug!(
            bundle = %descriptor.id,
            size_bytes = buffer.size_bytes(),
            "Loaded bundle into cache"
        );

        let entry = CachedBundle {
            buffer: Arc::clone(&buffer),
            last_accessed: Instant::now(),
        };
        if let Some((evicted, _)) = self.entries.lock().push(descriptor.id.clone(), entry) {
            if evicted != descriptor.id {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(bundle = %evicted, "Evicted least recently used bundle");
            }
        }

        Ok(buffer)
    }

    /// Drop the id's load lock from the table once no other caller holds it.
    fn release_gate(&self, id: &str, gate: &Arc<Mutex<()>>) {
        let mut loading = self.loading.lock();
        let last_holder = loading
            .get(id)
            .is_some_and(|current| Arc::ptr_eq(current, gate) && Arc::strong_count(current) == 2);
        if last_holder {
            loading.remove(id);
        }
    }

    /// Whether `id` is resident. Does not affect recency.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.lock().contains(id)
    }

    /// Last access time of a resident bundle. Does not affect recency.
    pub fn last_accessed(&self, id: &str) -> Option<Instant> {
        self.entries.lock().peek(id).map(|entry| entry.last_accessed)
    }

    /// Resident ids, most recently used first.
    pub fn ids_by_recency(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Number of resident bundles.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of resident bundles.
    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    /// Drop every resident bundle. Loads in progress still insert.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl Default for BundleCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for BundleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleCache")
            .field("capacity", &self.capacity())
            .field("stats", &self.stats())
            .finish()
    }
}
