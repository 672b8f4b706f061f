//! `.bundlx` index parsing.
//!
//! The index is a 16-byte header followed by 16384 five-byte little-endian
//! records, one per slot. Record `i` starts at byte `16 + 5 * i` and holds
//! the absolute offset of the slot's record inside the `.bundle` file.

use std::fmt;
use std::str::FromStr;

use super::error::BundleError;
use super::layout::{INDEX_HEADER_LEN, INDEX_RECORD_LEN, SLOT_COUNT};

/// How many bytes of each index record are decoded.
///
/// Records are 40-bit offsets. [`OffsetMode::Compat`] reads only the low
/// four bytes, which truncates offsets at or above 4 GiB but matches the
/// behaviour existing exports were produced with. [`OffsetMode::Full`]
/// decodes all five bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetMode {
    #[default]
    Compat,
    Full,
}

impl OffsetMode {
    /// Config/CLI spelling of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            OffsetMode::Compat => "compat",
            OffsetMode::Full => "full",
        }
    }
}

impl fmt::Display for OffsetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OffsetMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compat" | "4" => Ok(OffsetMode::Compat),
            "full" | "5" => Ok(OffsetMode::Full),
            other => Err(format!(
                "unknown offset mode '{}' (expected 'compat' or 'full')",
                other
            )),
        }
    }
}

/// Absolute `.bundle` offset recorded for `local_index`.
pub fn get_offset(
    index_bytes: &[u8],
    local_index: usize,
    mode: OffsetMode,
) -> Result<u64, BundleError> {
    if local_index >= SLOT_COUNT {
        return Err(BundleError::SlotOutOfRange(local_index));
    }

    let start = INDEX_HEADER_LEN + INDEX_RECORD_LEN * local_index;
    let width = match mode {
        OffsetMode::Compat => 4,
        OffsetMode::Full => INDEX_RECORD_LEN,
    };

    let record = index_bytes
        .get(start..start + width)
        .ok_or(BundleError::CorruptIndex {
            local_index,
            needed: start + width,
            index_len: index_bytes.len(),
        })?;

    Ok(record
        .iter()
        .rev()
        .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte)))
}
