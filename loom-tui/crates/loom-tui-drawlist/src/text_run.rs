//! Styled text-run blobs.
//!
//! A text run is a blob holding a segment count followed by fixed-size
//! segments, each a packed style plus a string reference:
//!
//! ```text
//! seg_count u32
//! { style (24 bytes) | string_id u32 | byte_off u32 | byte_len u32 } * seg_count
//! ```

use bytes::{BufMut, BytesMut};
use loom_tui_core::DrawStyle;

use crate::codec::{len_u32, Reader};
use crate::format::{PackedStyle, TEXT_RUN_SEGMENT_SIZE};

/// One styled piece of a text run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextRunSegment {
    /// Segment text.
    pub text: String,
    /// Segment style.
    pub style: DrawStyle,
}

impl TextRunSegment {
    /// Creates a segment.
    pub fn new(text: impl Into<String>, style: DrawStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// A decoded text-run segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRunEntry {
    /// Packed segment style.
    pub style: PackedStyle,
    /// String id of the segment text.
    pub string_id: u32,
    /// Offset into that string.
    pub byte_off: u32,
    /// Length within that string.
    pub byte_len: u32,
}

/// Encodes resolved segments into blob bytes.
pub(crate) fn encode(entries: &[TextRunEntry]) -> BytesMut {
    let mut buf = BytesMut::with_capacity(4 + entries.len() * TEXT_RUN_SEGMENT_SIZE);
    buf.put_u32_le(len_u32(entries.len()));
    for entry in entries {
        entry.style.encode(&mut buf);
        buf.put_u32_le(entry.string_id);
        buf.put_u32_le(entry.byte_off);
        buf.put_u32_le(entry.byte_len);
    }
    buf
}

/// Decodes blob bytes into segments, or `None` if truncated.
pub(crate) fn decode(blob: &[u8]) -> Option<Vec<TextRunEntry>> {
    let reader = Reader::new(blob);
    let count = reader.u32(0)? as usize;
    let needed = count.checked_mul(TEXT_RUN_SEGMENT_SIZE)?.checked_add(4)?;
    if blob.len() < needed {
        return None;
    }
    (0..count)
        .map(|index| {
            let base = 4 + index * TEXT_RUN_SEGMENT_SIZE;
            Some(TextRunEntry {
                style: PackedStyle::decode(&reader, base)?,
                string_id: reader.u32(base + 24)?,
                byte_off: reader.u32(base + 28)?,
                byte_len: reader.u32(base + 32)?,
            })
        })
        .collect()
}
