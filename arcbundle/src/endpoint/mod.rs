//! Single-tile lookup against a shared bundle cache.
//!
//! The endpoint maps an `(x, y, z)` request (column, row, zoom) to the
//! bundle that owns the tile, fetches that bundle through the
//! [`BundleCache`] and slices one tile out of it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

use crate::bundle::{BundleDescriptor, BundleError, OffsetMode};
use crate::cache::BundleCache;
use crate::coord::TileCoord;

/// Content type reported for PNG payloads.
pub const CONTENT_TYPE_PNG: &str = "image/png";
/// Content type reported for JPEG payloads.
pub const CONTENT_TYPE_JPEG: &str = "image/jpeg";
/// Content type reported for GIF payloads.
pub const CONTENT_TYPE_GIF: &str = "image/gif";
/// Content type reported for WebP payloads.
pub const CONTENT_TYPE_WEBP: &str = "image/webp";

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const GIF87_MAGIC: &[u8] = b"GIF87a";
const GIF89_MAGIC: &[u8] = b"GIF89a";

/// Result of a tile lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileResponse {
    Found {
        bytes: Bytes,
        content_type: &'static str,
    },
    /// The slot is empty or the owning bundle does not exist.
    NotFound,
}

/// Errors from [`TileEndpoint::fetch`].
#[derive(Debug, Error)]
pub enum EndpointError {
    /// Coordinates outside the tile grid of the requested zoom.
    #[error("invalid tile z={z} x={x} y={y}")]
    InvalidTile { x: u32, y: u32, z: u8 },

    /// The bundle exists but could not be read or is corrupt.
    #[error("storage error: {0}")]
    Storage(#[from] BundleError),
}

impl EndpointError {
    /// True for errors caused by the request rather than the cache.
    pub fn is_client_error(&self) -> bool {
        matches!(self, EndpointError::InvalidTile { .. })
    }
}

/// Serves individual tiles out of a bundle cache directory.
#[derive(Debug, Clone)]
pub struct TileEndpoint {
    cache: Arc<BundleCache>,
    root: PathBuf,
    offset_mode: OffsetMode,
}

impl TileEndpoint {
    pub fn new(cache: Arc<BundleCache>, root: impl Into<PathBuf>, offset_mode: OffsetMode) -> Self {
        Self {
            cache,
            root: root.into(),
            offset_mode,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn offset_mode(&self) -> OffsetMode {
        self.offset_mode
    }

    pub fn cache(&self) -> &Arc<BundleCache> {
        &self.cache
    }

    /// Look up the tile at column `x`, row `y`, zoom `z`.
    ///
    /// # Errors
    ///
    /// - `InvalidTile` if `z > MAX_ZOOM` or `x`/`y` are outside `0..2^z`
    /// - `Storage` if the owning bundle is unreadable or corrupt
    pub fn fetch(&self, x: u32, y: u32, z: u8) -> Result<TileResponse, EndpointError> {
        let tile = TileCoord::new(y, x, z);
        if !tile.is_valid() {
            return Err(EndpointError::InvalidTile { x, y, z });
        }

        let descriptor = BundleDescriptor::for_tile(&self.root, &tile);
        let slot = descriptor.slot_of(&tile)?;

        let buffer = match self.cache.get(&descriptor) {
            Ok(buffer) => buffer,
            Err(e) if e.is_not_found() => {
                debug!(z, x, y, bundle = %descriptor.id, "Bundle not present");
                return Ok(TileResponse::NotFound);
            }
            Err(e) => return Err(e.into()),
        };

        match buffer.tile(slot, self.offset_mode) {
            Ok(Some(bytes)) => {
                let content_type = sniff_content_type(&bytes);
                debug!(z, x, y, slot, size = bytes.len(), content_type, "Tile found");
                Ok(TileResponse::Found {
                    bytes,
                    content_type,
                })
            }
            Ok(None) => {
                debug!(z, x, y, slot, bundle = %descriptor.id, "Empty slot");
                Ok(TileResponse::NotFound)
            }
            Err(e) => {
                warn!(z, x, y, slot, bundle = %descriptor.id, error = %e, "Corrupt tile record");
                Err(e.into())
            }
        }
    }
}

/// Image MIME type inferred from the payload signature. Unrecognised
/// payloads are reported as PNG, the cache's usual tile format.
pub fn sniff_content_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(PNG_MAGIC) {
        CONTENT_TYPE_PNG
    } else if bytes.starts_with(JPEG_MAGIC) {
        CONTENT_TYPE_JPEG
    } else if bytes.starts_with(GIF87_MAGIC) || bytes.starts_with(GIF89_MAGIC) {
        CONTENT_TYPE_GIF
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        CONTENT_TYPE_WEBP
    } else {
        CONTENT_TYPE_PNG
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::fixture::BundleFixture;
    use crate::coord::MAX_ZOOM;
    use std::fs;

    const PNG_TILE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3];

    fn endpoint(root: &Path) -> TileEndpoint {
        TileEndpoint::new(Arc::new(BundleCache::new(4)), root, OffsetMode::Compat)
    }

    #[test]
    fn test_sniff_content_type() {
        assert_eq!(sniff_content_type(PNG_TILE), CONTENT_TYPE_PNG);
        assert_eq!(sniff_content_type(&[0xFF, 0xD8, 0xFF, 0xE0]), CONTENT_TYPE_JPEG);
        assert_eq!(sniff_content_type(b"GIF89a\x01\x00"), CONTENT_TYPE_GIF);
        assert_eq!(sniff_content_type(b"GIF87a"), CONTENT_TYPE_GIF);
        assert_eq!(sniff_content_type(b"RIFF\x10\0\0\0WEBPVP8 "), CONTENT_TYPE_WEBP);
        assert_eq!(sniff_content_type(b"RIFF"), CONTENT_TYPE_PNG);
        assert_eq!(sniff_content_type(&[]), CONTENT_TYPE_PNG);
        assert_eq!(sniff_content_type(b"\0\0\0"), CONTENT_TYPE_PNG);
    }

    #[test]
    fn test_fetch_gif_tile_has_image_content_type() {
        let temp = tempfile::TempDir::new().unwrap();
        let d = BundleDescriptor::new(temp.path(), 3, 0, 0);
        BundleFixture::new()
            .with_tile(0, b"GIF89a\x01\x00")
            .write_to(&d);

        match endpoint(temp.path()).fetch(0, 0, 3).unwrap() {
            TileResponse::Found { content_type, .. } => {
                assert_eq!(content_type, CONTENT_TYPE_GIF);
                assert!(content_type.starts_with("image/"));
            }
            TileResponse::NotFound => panic!("expected tile"),
        }
    }

    #[test]
    fn test_fetch_found() {
        let temp = tempfile::TempDir::new().unwrap();
        // Tile x=140 (col), y=300 (row) at z=9 lives in R0080C0100, slot 128*44+12
        let d = BundleDescriptor::new(temp.path(), 9, 256, 128);
        BundleFixture::new()
            .with_tile(128 * 44 + 12, PNG_TILE)
            .write_to(&d);

        let response = endpoint(temp.path()).fetch(140, 300, 9).unwrap();
        assert_eq!(
            response,
            TileResponse::Found {
                bytes: Bytes::from_static(PNG_TILE),
                content_type: CONTENT_TYPE_PNG,
            }
        );
    }

    #[test]
    fn test_fetch_empty_slot_is_not_found() {
        let temp = tempfile::TempDir::new().unwrap();
        let d = BundleDescriptor::new(temp.path(), 3, 0, 0);
        BundleFixture::new().with_tile(0, b"x").write_to(&d);

        let response = endpoint(temp.path()).fetch(1, 1, 3).unwrap();
        assert_eq!(response, TileResponse::NotFound);
    }

    #[test]
    fn test_fetch_missing_bundle_is_not_found() {
        let temp = tempfile::TempDir::new().unwrap();
        let response = endpoint(temp.path()).fetch(0, 0, 5).unwrap();
        assert_eq!(response, TileResponse::NotFound);
    }

    #[test]
    fn test_fetch_rejects_out_of_grid() {
        let temp = tempfile::TempDir::new().unwrap();
        let ep = endpoint(temp.path());

        let err = ep.fetch(4, 0, 2).unwrap_err();
        assert!(err.is_client_error());
        assert!(ep.fetch(0, 4, 2).is_err());
        assert!(matches!(
            ep.fetch(0, 0, MAX_ZOOM + 1),
            Err(EndpointError::InvalidTile { .. })
        ));
    }

    #[test]
    fn test_fetch_corrupt_data_is_storage_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let d = BundleDescriptor::new(temp.path(), 4, 0, 0);
        BundleFixture::new().with_tile(0, b"payload").write_to(&d);
        let data = fs::read(&d.data_path).unwrap();
        fs::write(&d.data_path, &data[..data.len() - 3]).unwrap();

        let err = endpoint(temp.path()).fetch(0, 0, 4).unwrap_err();
        assert!(matches!(
            err,
            EndpointError::Storage(BundleError::CorruptData { .. })
        ));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_fetch_reuses_cached_bundle() {
        let temp = tempfile::TempDir::new().unwrap();
        let d = BundleDescriptor::new(temp.path(), 6, 0, 0);
        BundleFixture::new()
            .with_tile(0, b"a")
            .with_tile(1, b"b")
            .write_to(&d);

        let ep = endpoint(temp.path());
        ep.fetch(0, 0, 6).unwrap();
        ep.fetch(1, 0, 6).unwrap();

        let stats = ep.cache().stats();
        assert_eq!(stats.loads, 1);
        assert_eq!(stats.hits, 1);
    }
}
