//! `.bundle` data record parsing.
//!
//! Each tile record is a four-byte little-endian length followed by that
//! many payload bytes, addressed by the absolute offset from the index.

use super::error::BundleError;
use super::layout::TILE_LENGTH_PREFIX;

/// Payload of the record at `offset`, or `None` for an empty slot.
pub fn read_tile(data_bytes: &[u8], offset: u64) -> Result<Option<&[u8]>, BundleError> {
    let range = tile_range(data_bytes, offset)?;
    if range.is_empty() {
        return Ok(None);
    }
    Ok(Some(&data_bytes[range]))
}

/// Byte range of the payload at `offset`; empty for an empty slot.
pub(crate) fn tile_range(
    data_bytes: &[u8],
    offset: u64,
) -> Result<std::ops::Range<usize>, BundleError> {
    let corrupt = |length: u64| BundleError::CorruptData {
        offset,
        length,
        data_len: data_bytes.len(),
    };

    let start = usize::try_from(offset).map_err(|_| corrupt(0))?;
    let prefix = start
        .checked_add(TILE_LENGTH_PREFIX)
        .and_then(|end| data_bytes.get(start..end))
        .ok_or_else(|| corrupt(0))?;

    let length = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
    if length == 0 {
        return Ok(0..0);
    }

    let payload_start = start + TILE_LENGTH_PREFIX;
    let payload_end = payload_start
        .checked_add(length as usize)
        .filter(|&end| end <= data_bytes.len())
        .ok_or_else(|| corrupt(u64::from(length)))?;

    Ok(payload_start..payload_end)
}
