//! Accessors for the 4-byte size prefix that precedes a size-prefixed buffer.
//!
//! A size-prefixed buffer is laid out as `prefix || payload`, where `prefix` is the length of
//! `payload` stored as a little-endian 32-bit integer.

use crate::err::{DeserializationError, DeserializationResult, SerializationError, SerializationResult};
use crate::utils::bytes;

use byteorder::{LittleEndian, WriteBytesExt};
use log::trace;
use std::io::Write;

/// Width in bytes of the size prefix.
pub const SIZE_PREFIX_LENGTH: usize = 4;

/// Reads the size prefix at `offset` as a signed little-endian 32-bit integer.
///
/// The value is returned as stored, negative values included.
pub fn get_size_prefix(buf: &[u8], offset: usize) -> DeserializationResult<i32> {
    bytes::read_i32_le_r(buf, offset, "size prefix")
}

/// Reads the size prefix at `offset` as an unsigned little-endian 32-bit integer.
pub fn get_size_prefix_u32(buf: &[u8], offset: usize) -> DeserializationResult<u32> {
    bytes::read_u32_le_r(buf, offset, "size prefix")
}

/// Returns the same buffer together with `offset` advanced just past the size prefix.
///
/// Nothing is validated here. The offset saturates at `usize::MAX`, so a subsequent read reports
/// a truncation instead of wrapping around.
pub fn remove_size_prefix(buf: &[u8], offset: usize) -> (&[u8], usize) {
    (buf, offset.saturating_add(SIZE_PREFIX_LENGTH))
}

/// Reads the size prefix at `offset` and returns the payload it describes.
pub fn size_prefixed_payload(buf: &[u8], offset: usize) -> DeserializationResult<&[u8]> {
    let size = checked_size(buf, offset)?;
    let (buf, payload_offset) = remove_size_prefix(buf, offset);
    let available = buf.len().saturating_sub(payload_offset);

    if size > available {
        return Err(DeserializationError::SizePrefixOutOfBounds {
            offset: offset as u64,
            size,
            available,
        });
    }

    bytes::slice_r(buf, payload_offset, size, "size-prefixed payload")
}

/// Reads the prefix at `offset` and converts it to a length, rejecting negative values.
pub(crate) fn checked_size(buf: &[u8], offset: usize) -> DeserializationResult<usize> {
    let value = get_size_prefix(buf, offset)?;
    usize::try_from(value).map_err(|_| DeserializationError::NegativeSizePrefix {
        offset: offset as u64,
        value,
    })
}

pub(crate) fn size_prefix_for(len: usize) -> SerializationResult<i32> {
    i32::try_from(len).map_err(|_| SerializationError::PayloadTooLarge { len })
}

/// Returns a new buffer holding the size prefix for `payload` followed by `payload`.
pub fn prepend_size_prefix(payload: &[u8]) -> SerializationResult<Vec<u8>> {
    let mut out = Vec::with_capacity(SIZE_PREFIX_LENGTH + payload.len());
    write_size_prefixed(&mut out, payload)?;
    Ok(out)
}

/// Writes the size prefix for `payload` followed by `payload`, returning the number of bytes written.
pub fn write_size_prefixed<W: Write>(writer: &mut W, payload: &[u8]) -> SerializationResult<usize> {
    let prefix = size_prefix_for(payload.len())?;
    trace!("Writing size-prefixed buffer of {} bytes", prefix);

    writer.write_i32::<LittleEndian>(prefix)?;
    writer.write_all(payload)?;

    Ok(SIZE_PREFIX_LENGTH + payload.len())
}
