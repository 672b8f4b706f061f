//! Fully loaded bundle contents.

use std::time::Instant;

use bytes::Bytes;

use super::data::tile_range;
use super::error::BundleError;
use super::index::{get_offset, OffsetMode};

/// Both files of one bundle read into memory.
///
/// Immutable after load. Tiles handed out by [`BundleBuffer::tile`] are
/// slices of the shared data buffer, not copies.
#[derive(Debug)]
pub struct BundleBuffer {
    id: String,
    index_bytes: Bytes,
    data_bytes: Bytes,
    created_at: Instant,
}

impl BundleBuffer {
    pub fn new(id: impl Into<String>, index_bytes: impl Into<Bytes>, data_bytes: impl Into<Bytes>) -> Self {
        Self {
            id: id.into(),
            index_bytes: index_bytes.into(),
            data_bytes: data_bytes.into(),
            created_at: Instant::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn index_bytes(&self) -> &[u8] {
        &self.index_bytes
    }

    pub fn data_bytes(&self) -> &[u8] {
        &self.data_bytes
    }

    /// When the files were read.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Combined size of index and data in bytes.
    pub fn size_bytes(&self) -> usize {
        self.index_bytes.len() + self.data_bytes.len()
    }

    /// Tile in `slot`, or `None` if the slot is empty.
    pub fn tile(&self, slot: usize, mode: OffsetMode) -> Result<Option<Bytes>, BundleError> {
        let offset = get_offset(&self.index_bytes, slot, mode)?;
        let range = tile_range(&self.data_bytes, offset)?;
        if range.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.data_bytes.slice(range)))
    }
}
