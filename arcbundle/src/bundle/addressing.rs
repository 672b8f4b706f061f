//! Mapping between tile coordinates, 128-aligned bundle blocks and bundle files.
//!
//! # Path layout
//!
//! ```text
//! {root}/L{level:02}/R{origin_col:04X}C{origin_row:04X}.bundle
//! {root}/L{level:02}/R{origin_col:04X}C{origin_row:04X}.bundlx
//! ```
//!
//! The `R` segment carries the column group and the `C` segment the row
//! group. Inside a bundle the slot for a tile is `128 * dx + dy` with
//! `dx = row - origin_row` and `dy = col - origin_col`, so the axis that
//! names the `C` segment is also the major axis of the slot index.

use std::path::{Path, PathBuf};

use crate::coord::TileCoord;

use super::error::BundleError;
use super::layout::{BUNDLE_DIM, DATA_EXTENSION, INDEX_EXTENSION, SLOT_COUNT};

/// Group origin used when enumerating bundles over a range of tiles.
///
/// Computes `((v + 1) / 128) * 128` with truncating division. Note that
/// this rounds `v = 127` (and every `128k - 1`) up to the next block; use
/// [`block_origin`] when the exact owner of a single tile is needed.
///
/// The last block of the `u32` range is the ceiling: `u32::MAX` maps to
/// `block_origin(u32::MAX)` rather than wrapping.
#[inline]
pub fn group_origin(v: u32) -> u32 {
    let dim = u64::from(BUNDLE_DIM);
    let origin = ((u64::from(v) + 1) / dim) * dim;
    u32::try_from(origin).unwrap_or(block_origin(u32::MAX))
}

/// Origin of the block that actually contains `v`.
#[inline]
pub fn block_origin(v: u32) -> u32 {
    (v / BUNDLE_DIM) * BUNDLE_DIM
}

/// Slot of block-local position `(dx, dy)`: `128 * dx + dy`.
#[inline]
pub fn local_index(dx: u32, dy: u32) -> usize {
    (BUNDLE_DIM * dx + dy) as usize
}

/// Data and index file paths of the bundle at the given origin.
pub fn path_for(root: &Path, level: u8, origin_row: u32, origin_col: u32) -> (PathBuf, PathBuf) {
    let base = bundle_base_name(origin_row, origin_col);
    let dir = root.join(level_dir_name(level));
    let data = dir.join(format!("{}.{}", base, DATA_EXTENSION));
    let index = dir.join(format!("{}.{}", base, INDEX_EXTENSION));
    (data, index)
}

/// Level directory name, e.g. `L03`.
pub fn level_dir_name(level: u8) -> String {
    format!("L{:02}", level)
}

/// Bundle base filename without extension, e.g. `R0200C0100`.
pub fn bundle_base_name(origin_row: u32, origin_col: u32) -> String {
    format!("R{:04X}C{:04X}", origin_col, origin_row)
}

/// One 128×128 block of tiles and the files that store it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BundleDescriptor {
    pub level: u8,
    pub origin_row: u32,
    pub origin_col: u32,
    pub data_path: PathBuf,
    pub index_path: PathBuf,
    /// Cache key: level directory plus base filename, e.g. `L03/R0200C0100`.
    pub id: String,
}

impl BundleDescriptor {
    /// Build the descriptor for an origin. Origins are snapped down to a
    /// multiple of 128.
    pub fn new(root: &Path, level: u8, origin_row: u32, origin_col: u32) -> Self {
        let origin_row = block_origin(origin_row);
        let origin_col = block_origin(origin_col);
        let (data_path, index_path) = path_for(root, level, origin_row, origin_col);
        let id = format!(
            "{}/{}",
            level_dir_name(level),
            bundle_base_name(origin_row, origin_col)
        );

        Self {
            level,
            origin_row,
            origin_col,
            data_path,
            index_path,
            id,
        }
    }

    /// The bundle that stores `tile`.
    pub fn for_tile(root: &Path, tile: &TileCoord) -> Self {
        Self::new(root, tile.zoom, tile.row, tile.col)
    }

    /// Whether `tile` lies inside this bundle's block.
    pub fn contains(&self, tile: &TileCoord) -> bool {
        tile.zoom == self.level
            && tile.row >= self.origin_row
            && tile.row - self.origin_row < BUNDLE_DIM
            && tile.col >= self.origin_col
            && tile.col - self.origin_col < BUNDLE_DIM
    }

    /// Slot of `tile` within this bundle.
    pub fn slot_of(&self, tile: &TileCoord) -> Result<usize, BundleError> {
        if !self.contains(tile) {
            return Err(BundleError::TileOutsideBundle {
                tile: *tile,
                bundle: self.id.clone(),
            });
        }
        Ok(local_index(
            tile.row - self.origin_row,
            tile.col - self.origin_col,
        ))
    }

    /// Tile stored at `slot` in this bundle.
    pub fn tile_at(&self, slot: usize) -> TileCoord {
        let dim = BUNDLE_DIM as usize;
        TileCoord {
            row: self.origin_row + (slot / dim) as u32,
            col: self.origin_col + (slot % dim) as u32,
            zoom: self.level,
        }
    }

    /// All `(slot, tile)` pairs in slot order.
    pub fn slots(&self) -> impl Iterator<Item = (usize, TileCoord)> + '_ {
        (0..SLOT_COUNT).map(move |slot| (slot, self.tile_at(slot)))
    }
}

/// Descriptors of every block intersecting the inclusive tile box.
///
/// Block origins run from `group_origin(min)` to `group_origin(max)` in
/// steps of 128 along each axis. Bounds may be given in either order.
pub fn enumerate_bundles(
    root: &Path,
    level: u8,
    row_min: u32,
    row_max: u32,
    col_min: u32,
    col_max: u32,
) -> Vec<BundleDescriptor> {
    let (row_lo, row_hi) = ordered(row_min, row_max);
    let (col_lo, col_hi) = ordered(col_min, col_max);

    let rows = (group_origin(row_lo)..=group_origin(row_hi)).step_by(BUNDLE_DIM as usize);

    rows.flat_map(|origin_row| {
        (group_origin(col_lo)..=group_origin(col_hi))
            .step_by(BUNDLE_DIM as usize)
            .map(move |origin_col| BundleDescriptor::new(root, level, origin_row, origin_col))
    })
    .collect()
}

fn ordered(a: u32, b: u32) -> (u32, u32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_origin_values() {
        assert_eq!(group_origin(0), 0);
        assert_eq!(group_origin(126), 0);
        assert_eq!(group_origin(127), 128);
        assert_eq!(group_origin(128), 128);
        assert_eq!(group_origin(254), 128);
        assert_eq!(group_origin(255), 256);
    }

    #[test]
    fn test_block_origin_values() {
        assert_eq!(block_origin(0), 0);
        assert_eq!(block_origin(127), 0);
        assert_eq!(block_origin(128), 128);
        assert_eq!(block_origin(1000), 896);
    }

    #[test]
    fn test_path_for_example() {
        let (data, index) = path_for(Path::new("C:\\cache"), 3, 256, 512);
        assert_eq!(
            data,
            Path::new("C:\\cache").join("L03").join("R0200C0100.bundle")
        );
        assert_eq!(
            index,
            Path::new("C:\\cache").join("L03").join("R0200C0100.bundlx")
        );
    }

    #[test]
    fn test_path_for_uses_uppercase_hex() {
        let (data, _) = path_for(Path::new("/cache"), 12, 0xAB80, 0x1F00);
        assert_eq!(data, Path::new("/cache/L12/R1F00CAB80.bundle"));
    }

    #[test]
    fn test_descriptor_id() {
        let d = BundleDescriptor::new(Path::new("/cache"), 3, 256, 512);
        assert_eq!(d.id, "L03/R0200C0100");
        assert_eq!(d.origin_row, 256);
        assert_eq!(d.origin_col, 512);
    }

    #[test]
    fn test_local_index_formula() {
        assert_eq!(local_index(0, 0), 0);
        assert_eq!(local_index(0, 1), 1);
        assert_eq!(local_index(1, 0), 128);
        assert_eq!(local_index(127, 127), 16383);
    }

    #[test]
    fn test_for_tile_and_slot_of() {
        let tile = TileCoord::new(300, 140, 9);
        let d = BundleDescriptor::for_tile(Path::new("/cache"), &tile);

        assert_eq!(d.origin_row, 256);
        assert_eq!(d.origin_col, 128);
        assert!(d.contains(&tile));
        assert_eq!(d.slot_of(&tile).unwrap(), 128 * 44 + 12);
        assert_eq!(d.tile_at(128 * 44 + 12), tile);
    }

    #[test]
    fn test_slot_of_rejects_foreign_tile() {
        let d = BundleDescriptor::new(Path::new("/cache"), 9, 0, 0);
        assert!(d.slot_of(&TileCoord::new(128, 0, 9)).is_err());
        assert!(d.slot_of(&TileCoord::new(0, 0, 8)).is_err());
    }

    #[test]
    fn test_slots_cover_block_once() {
        let d = BundleDescriptor::new(Path::new("/cache"), 10, 128, 256);
        let tiles: Vec<_> = d.slots().collect();

        assert_eq!(tiles.len(), SLOT_COUNT);
        assert_eq!(tiles[0].1, TileCoord::new(128, 256, 10));
        assert_eq!(tiles[1].1, TileCoord::new(128, 257, 10));
        assert_eq!(tiles[SLOT_COUNT - 1].1, TileCoord::new(255, 383, 10));
        assert!(tiles.iter().all(|(_, t)| d.contains(t)));
    }

    #[test]
    fn test_enumerate_single_block() {
        let bundles = enumerate_bundles(Path::new("/cache"), 5, 10, 20, 30, 40);
        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].origin_row, 0);
        assert_eq!(bundles[0].origin_col, 0);
    }

    #[test]
    fn test_enumerate_spans_blocks() {
        let bundles = enumerate_bundles(Path::new("/cache"), 12, 100, 300, 500, 520);
        let origins: Vec<_> = bundles
            .iter()
            .map(|b| (b.origin_row, b.origin_col))
            .collect();
        assert_eq!(
            origins,
            vec![
                (0, 384),
                (0, 512),
                (128, 384),
                (128, 512),
                (256, 384),
                (256, 512)
            ]
        );
    }

    #[test]
    fn test_group_origin_top_of_range() {
        assert_eq!(group_origin(u32::MAX), 0xFFFF_FF80);
        assert_eq!(group_origin(u32::MAX - 1), 0xFFFF_FF80);
        assert_eq!(group_origin(0xFFFF_FF7F), 0xFFFF_FF80);
    }

    #[test]
    fn test_enumerate_at_top_of_range() {
        let bundles = enumerate_bundles(Path::new("/cache"), 24, u32::MAX - 5, u32::MAX, 0, 0);
        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].origin_row, 0xFFFF_FF80);
        assert_eq!(bundles[0].origin_col, 0);
    }

    #[test]
    fn test_enumerate_accepts_reversed_bounds() {
        let a = enumerate_bundles(Path::new("/cache"), 12, 300, 100, 520, 500);
        let b = enumerate_bundles(Path::new("/cache"), 12, 100, 300, 500, 520);
        assert_eq!(a, b);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_group_origin_aligned_and_idempotent(v in any::<u32>()) {
                let g = group_origin(v);
                prop_assert_eq!(g % 128, 0);
                prop_assert_eq!(group_origin(g), g);
            }

            #[test]
            fn test_equal_group_origin_same_path(
                a in 0u32..(1 << 20),
                delta in 0u32..128,
                col in 0u32..(1 << 20),
                level in 0u8..=20
            ) {
                let root = Path::new("/cache");
                let b = (group_origin(a) + delta).saturating_sub(1);
                prop_assert_eq!(group_origin(a), group_origin(b));

                let da = BundleDescriptor::new(root, level, group_origin(a), group_origin(col));
                let db = BundleDescriptor::new(root, level, group_origin(b), group_origin(col));
                prop_assert_eq!(&da.data_path, &db.data_path);
                prop_assert_eq!(&da.index_path, &db.index_path);
                prop_assert_eq!(da.id, db.id);
            }

            #[test]
            fn test_owning_bundle_contains_tile(
                row in 0u32..(1 << 20),
                col in 0u32..(1 << 20)
            ) {
                let tile = TileCoord::new(row, col, 20);
                let d = BundleDescriptor::for_tile(Path::new("/cache"), &tile);
                let slot = d.slot_of(&tile)?;
                prop_assert!(slot < SLOT_COUNT);
                prop_assert_eq!(d.tile_at(slot), tile);
            }
        }
    }
}
