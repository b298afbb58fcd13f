//! Byte-slice utilities for bounds-oriented parsing.
//!
//! There are two layers:
//! - **Option layer** (`read_*`): helpers that return `Option<T>`.
//! - **Result layer** (`*_r`): wrappers that map `None` to `DeserializationError::Truncated`.
//!
//! Only the 32-bit readers exist, since the size prefix is the one fixed-width field read here.
//! All numeric reads are **little-endian**. Offsets are `usize` and are interpreted relative to
//! the slice you pass in.

use crate::err::DeserializationError;

/// Read `N` raw bytes at `offset`.
///
/// Returns `None` if the range is out of bounds (including when `offset + N` overflows).
pub(crate) fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    let bytes: [u8; N] = buf.get(offset..end)?.try_into().ok()?;
    Some(bytes)
}

/// Read an `i32` (little-endian) at `offset`.
pub(crate) fn read_i32_le(buf: &[u8], offset: usize) -> Option<i32> {
    Some(i32::from_le_bytes(read_array::<4>(buf, offset)?))
}

/// Read a `u32` (little-endian) at `offset`.
pub(crate) fn read_u32_le(buf: &[u8], offset: usize) -> Option<u32> {
    Some(u32::from_le_bytes(read_array::<4>(buf, offset)?))
}

#[inline]
pub(crate) fn truncated(
    what: &'static str,
    offset: usize,
    need: usize,
    len: usize,
) -> DeserializationError {
    DeserializationError::Truncated {
        what,
        offset: offset as u64,
        need,
        have: len.saturating_sub(offset),
    }
}

pub(crate) fn slice_r<'a>(
    buf: &'a [u8],
    offset: usize,
    len: usize,
    what: &'static str,
) -> Result<&'a [u8], DeserializationError> {
    let end = offset
        .checked_add(len)
        .ok_or_else(|| truncated(what, offset, len, buf.len()))?;
    buf.get(offset..end)
        .ok_or_else(|| truncated(what, offset, len, buf.len()))
}

/// Read an `i32` (little-endian) at `offset`, or return `DeserializationError::Truncated`.
pub(crate) fn read_i32_le_r(
    buf: &[u8],
    offset: usize,
    what: &'static str,
) -> Result<i32, DeserializationError> {
    read_i32_le(buf, offset).ok_or_else(|| truncated(what, offset, 4, buf.len()))
}

/// Read a `u32` (little-endian) at `offset`, or return `DeserializationError::Truncated`.
pub(crate) fn read_u32_le_r(
    buf: &[u8],
    offset: usize,
    what: &'static str,
) -> Result<u32, DeserializationError> {
    read_u32_le(buf, offset).ok_or_else(|| truncated(what, offset, 4, buf.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reads_little_endian_values_at_offset() {
        let buf = [0xAA, 0x01, 0x00, 0x00, 0x80, 0xBB];
        assert_eq!(read_i32_le(&buf, 1), Some(i32::MIN + 1));
        assert_eq!(read_u32_le(&buf, 1), Some(0x8000_0001));
        assert_eq!(read_array::<2>(&buf, 4), Some([0x80, 0xBB]));
    }

    #[test]
    fn test_out_of_range_reads_return_none() {
        let buf = [0_u8; 4];
        assert_eq!(read_i32_le(&buf, 1), None);
        assert_eq!(read_i32_le(&buf, usize::MAX), None);
        assert_eq!(read_array::<0>(&buf, 4), Some([]));
    }

    #[test]
    fn test_truncated_error_reports_remaining_bytes() {
        let buf = [0_u8; 6];
        match read_u32_le_r(&buf, 4, "size prefix") {
            Err(DeserializationError::Truncated {
                what,
                offset,
                need,
                have,
            }) => {
                assert_eq!(what, "size prefix");
                assert_eq!(offset, 4);
                assert_eq!(need, 4);
                assert_eq!(have, 2);
            }
            other => panic!("expected a truncation error, got {:?}", other),
        }
    }

    #[test]
    fn test_slice_r_allows_empty_slice_at_end() {
        let buf = [1_u8, 2, 3];
        assert_eq!(slice_r(&buf, 3, 0, "payload").unwrap(), &[] as &[u8]);
        assert!(slice_r(&buf, 4, 0, "payload").is_err());
        assert!(slice_r(&buf, 1, usize::MAX, "payload").is_err());
    }
}
