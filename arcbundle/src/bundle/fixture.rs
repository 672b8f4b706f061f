//! Synthetic bundle builder for tests.

use std::collections::BTreeMap;
use std::path::Path;

use super::addressing::BundleDescriptor;
use super::layout::{FULL_INDEX_LEN, INDEX_HEADER_LEN, INDEX_RECORD_LEN, SLOT_COUNT};

/// Size of the filler written ahead of the first record.
const DATA_HEADER_LEN: usize = 60;

/// Builds matching `.bundlx` / `.bundle` byte images.
///
/// Slots without a tile point at one shared zero-length record.
#[derive(Debug, Default, Clone)]
pub(crate) struct BundleFixture {
    tiles: BTreeMap<usize, Vec<u8>>,
}

impl BundleFixture {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_tile(mut self, slot: usize, payload: &[u8]) -> Self {
        assert!(slot < SLOT_COUNT);
        self.tiles.insert(slot, payload.to_vec());
        self
    }

    fn layout(&self) -> (Vec<u8>, Vec<u8>) {
        let mut data = vec![0u8; DATA_HEADER_LEN];
        let empty_offset = data.len() as u32;
        data.extend_from_slice(&0u32.to_le_bytes());

        let mut index = vec![0u8; FULL_INDEX_LEN];
        for slot in 0..SLOT_COUNT {
            let offset = match self.tiles.get(&slot) {
                Some(payload) => {
                    let offset = data.len() as u32;
                    data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
                    data.extend_from_slice(payload);
                    offset
                }
                None => empty_offset,
            };
            let start = INDEX_HEADER_LEN + INDEX_RECORD_LEN * slot;
            index[start..start + 4].copy_from_slice(&offset.to_le_bytes());
        }
        (index, data)
    }

    pub(crate) fn index(&self) -> Vec<u8> {
        self.layout().0
    }

    pub(crate) fn data(&self) -> Vec<u8> {
        self.layout().1
    }

    /// Write both files at the descriptor's paths.
    pub(crate) fn write_to(&self, descriptor: &BundleDescriptor) {
        let (index, data) = self.layout();
        let dir = descriptor.data_path.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(&descriptor.index_path, index).unwrap();
        std::fs::write(&descriptor.data_path, data).unwrap();
    }
}
