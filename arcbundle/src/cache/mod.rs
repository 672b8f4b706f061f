//! Bundle cache.
//!
//! Loaded bundles are expensive (two full file reads), while tile requests
//! tend to cluster on a handful of bundles. [`BundleCache`] keeps the most
//! recently used bundles in memory and is shared by reference between
//! consumers; there is no process-wide instance.
//!
//! ```ignore
//! use std::sync::Arc;
//! use arcbundle::cache::BundleCache;
//!
//! let cache = Arc::new(BundleCache::new(20));
//! let bundle = cache.get(&descriptor)?;
//! ```

mod memory;
mod traits;

pub use memory::{BundleCache, CacheStats, DEFAULT_CAPACITY};
pub use traits::{BundleLoader, FsBundleLoader};
