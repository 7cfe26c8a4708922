//! Little-endian encoding primitives.

use bytes::{Buf, BufMut, BytesMut};

/// Rounds `len` up to the next multiple of 4.
#[inline]
pub const fn align4(len: usize) -> usize {
    (len + 3) & !3
}

/// Appends zero bytes until `buf` is 4-byte aligned.
#[inline]
pub fn pad4(buf: &mut BytesMut) {
    let padded = align4(buf.len());
    buf.put_bytes(0, padded - buf.len());
}

/// Converts a buffer length to a `u32` field.
///
/// The builder rejects any growth that would push the finished buffer past
/// `u32::MAX` bytes, so every length it converts fits and the saturation is
/// never reached.
#[inline]
pub fn len_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Bounds-checked little-endian reads over a byte slice.
#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    /// Wraps a byte slice.
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Returns `len` bytes at `offset`, if in range.
    pub fn slice(&self, offset: usize, len: usize) -> Option<&'a [u8]> {
        let end = offset.checked_add(len)?;
        self.bytes.get(offset..end)
    }

    /// Reads a `u32` at `offset`.
    pub fn u32(&self, offset: usize) -> Option<u32> {
        self.slice(offset, 4).map(|mut b| b.get_u32_le())
    }

    /// Reads an `i32` at `offset`.
    pub fn i32(&self, offset: usize) -> Option<i32> {
        self.slice(offset, 4).map(|mut b| b.get_i32_le())
    }

    /// Reads a `u16` at `offset`.
    pub fn u16(&self, offset: usize) -> Option<u16> {
        self.slice(offset, 2).map(|mut b| b.get_u16_le())
    }

    /// Reads a `u8` at `offset`.
    pub fn u8(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align4() {
        assert_eq!(align4(0), 0);
        assert_eq!(align4(1), 4);
        assert_eq!(align4(4), 4);
        assert_eq!(align4(5), 8);
    }

    #[test]
    fn test_pad4() {
        let mut buf = BytesMut::new();
        buf.put_slice(b"abcde");
        pad4(&mut buf);
        assert_eq!(&buf[..], b"abcde\0\0\0");
        pad4(&mut buf);
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn test_reader_le_and_bounds() {
        let bytes = [0x78, 0x56, 0x34, 0x12, 0xFF, 0xFF, 0xFF, 0xFF];
        let reader = Reader::new(&bytes);
        assert_eq!(reader.u32(0), Some(0x1234_5678));
        assert_eq!(reader.i32(4), Some(-1));
        assert_eq!(reader.u16(0), Some(0x5678));
        assert_eq!(reader.u32(5), None);
        assert_eq!(reader.slice(usize::MAX, 2), None);
    }
}
