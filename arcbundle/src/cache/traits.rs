//! Loading seam between the bundle cache and storage.
//!
//! The cache never touches the filesystem directly; it asks a
//! [`BundleLoader`] for a fully read [`BundleBuffer`]. The default
//! [`FsBundleLoader`] reads both files from disk, and the batch exporter
//! uses the same loader so both consumers see identical bytes.

use std::fs;

use tracing::trace;

use crate::bundle::{BundleBuffer, BundleDescriptor, BundleError};

/// Source of fully loaded bundles.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the exporter calls `load` from
/// several worker threads at once.
pub trait BundleLoader: Send + Sync {
    /// Read both files of `descriptor` completely.
    ///
    /// # Errors
    ///
    /// - `FileNotFound` if either file is missing
    /// - `Io` for any other read failure
    fn load(&self, descriptor: &BundleDescriptor) -> Result<BundleBuffer, BundleError>;
}

/// Reads bundles from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsBundleLoader;

impl BundleLoader for FsBundleLoader {
    fn load(&self, descriptor: &BundleDescriptor) -> Result<BundleBuffer, BundleError> {
        let index = fs::read(&descriptor.index_path)
            .map_err(|e| BundleError::from_io(&descriptor.index_path, e))?;
        let data = fs::read(&descriptor.data_path)
            .map_err(|e| BundleError::from_io(&descriptor.data_path, e))?;

        trace!(
            bundle = %descriptor.id,
            index_bytes = index.len(),
            data_bytes = data.len(),
            "Loaded bundle from disk"
        );

        Ok(BundleBuffer::new(descriptor.id.clone(), index, data))
    }
}
