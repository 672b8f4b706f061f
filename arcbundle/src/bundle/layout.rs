//! Fixed dimensions of the compact cache bundle format.

/// Tiles per bundle along each axis.
pub const BUNDLE_DIM: u32 = 128;

/// Tile slots in one bundle (128 × 128).
pub const SLOT_COUNT: usize = (BUNDLE_DIM * BUNDLE_DIM) as usize;

/// Size of the ignored `.bundlx` header.
pub const INDEX_HEADER_LEN: usize = 16;

/// Size of one `.bundlx` offset record.
pub const INDEX_RECORD_LEN: usize = 5;

/// Length of an index that holds a record for every slot.
pub const FULL_INDEX_LEN: usize = INDEX_HEADER_LEN + INDEX_RECORD_LEN * SLOT_COUNT;

/// Size of the little-endian length prefix before each tile payload.
pub const TILE_LENGTH_PREFIX: usize = 4;

/// Extension of the bundle data file.
pub const DATA_EXTENSION: &str = "bundle";

/// Extension of the bundle index file.
pub const INDEX_EXTENSION: &str = "bundlx";
