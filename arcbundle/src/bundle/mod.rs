//! ArcGIS compact cache bundle format.
//!
//! A bundle stores up to 128×128 tiles of one zoom level in two files:
//!
//! - `.bundlx`: 16-byte header + 16384 five-byte offset records
//! - `.bundle`: `[u32 LE length][payload]` records at those offsets
//!
//! This module covers addressing ([`addressing`]), index lookup ([`index`]),
//! record extraction ([`data`]) and the loaded in-memory form
//! ([`BundleBuffer`]). Bundles are only ever read.

pub mod addressing;
mod buffer;
pub mod data;
mod error;
pub mod index;
pub mod layout;

#[cfg(test)]
pub(crate) mod fixture;

pub use addressing::{
    block_origin, enumerate_bundles, group_origin, local_index, path_for, BundleDescriptor,
};
pub use buffer::BundleBuffer;
pub use data::read_tile;
pub use error::BundleError;
pub use index::{get_offset, OffsetMode};
pub use layout::{BUNDLE_DIM, SLOT_COUNT};
