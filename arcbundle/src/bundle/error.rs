//! Error types for bundle addressing and parsing.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::coord::TileCoord;

/// Errors raised while locating, loading or parsing a bundle.
///
/// An empty tile slot is not an error: readers return `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum BundleError {
    /// The `.bundle` or `.bundlx` file does not exist.
    #[error("bundle file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    /// Reading a bundle file failed for another reason.
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The index record for a slot lies outside the index buffer.
    #[error("corrupt bundle index: record {local_index} needs {needed} bytes, index has {index_len}")]
    CorruptIndex {
        local_index: usize,
        needed: usize,
        index_len: usize,
    },

    /// A tile record's length prefix or payload lies outside the data buffer.
    #[error("corrupt bundle data: record at offset {offset} with length {length} exceeds {data_len} bytes")]
    CorruptData {
        offset: u64,
        length: u64,
        data_len: usize,
    },

    /// The tile does not belong to the bundle it was looked up in.
    #[error("tile {tile:?} is not stored in bundle {bundle}")]
    TileOutsideBundle { tile: TileCoord, bundle: String },

    /// A slot index outside `0..16384`.
    #[error("slot {0} is outside the bundle (max 16383)")]
    SlotOutOfRange(usize),
}

impl BundleError {
    /// Map an I/O error on `path`, promoting `NotFound` to [`BundleError::FileNotFound`].
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            BundleError::FileNotFound { path }
        } else {
            BundleError::Io { path, source }
        }
    }

    /// True when the bundle simply is not there, as opposed to being unreadable or corrupt.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BundleError::FileNotFound { .. })
    }
}
