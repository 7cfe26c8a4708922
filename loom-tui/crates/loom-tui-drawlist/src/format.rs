//! ZRDL wire format.
//!
//! A drawlist is a 64-byte header followed by three 4-byte aligned sections:
//!
//! ```text
//! +--------------------+ 0
//! | header (16 x u32)  |
//! +--------------------+ cmd_offset
//! | command records    |  opcode u16 | flags u16 | size u32 | payload
//! +--------------------+ strings_span_offset
//! | string spans       |  (byte_off u32, byte_len u32) per string
//! | string pool        |  UTF-8, zero padded to 4
//! +--------------------+ blobs_span_offset
//! | blob spans         |  (byte_off u32, byte_len u32) per blob
//! | blob pool          |  each blob starts 4-aligned
//! +--------------------+ total_size
//! ```
//!
//! All integers are little-endian. Offsets of empty sections are zero.

use bytes::{BufMut, BytesMut};
use loom_tui_core::style::pack_color;
use loom_tui_core::DrawStyle;
use serde::{Deserialize, Serialize};

use crate::codec::Reader;

/// `"ZRDL"` read as a little-endian `u32`.
pub const MAGIC: u32 = 0x4C44_525A;
/// Format version written by this crate.
pub const VERSION: u32 = 1;
/// Size of the fixed header.
pub const HEADER_SIZE: usize = 64;
/// Size of the common command record header.
pub const CMD_HEADER_SIZE: usize = 8;
/// Size of a packed style.
pub const STYLE_SIZE: usize = 24;
/// Size of one string or blob span.
pub const SPAN_SIZE: usize = 8;
/// Size of one text-run segment inside a text-run blob.
pub const TEXT_RUN_SEGMENT_SIZE: usize = STYLE_SIZE + 12;

/// Command opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Opcode {
    /// Clear the framebuffer.
    Clear = 1,
    /// Fill a rectangle with a style.
    FillRect = 2,
    /// Draw a span of an interned string.
    DrawText = 3,
    /// Push a clip rectangle.
    PushClip = 4,
    /// Pop the innermost clip rectangle.
    PopClip = 5,
    /// Draw a styled text-run blob.
    DrawTextRun = 6,
    /// Set cursor position, shape and visibility.
    SetCursor = 7,
    /// Draw an RGBA canvas blob with a blitter.
    DrawCanvas = 8,
    /// Draw an image blob with a terminal image protocol.
    DrawImage = 9,
    /// Define a string table entry.
    DefString = 10,
    /// Define a blob table entry.
    DefBlob = 12,
}

impl Opcode {
    /// Returns the fixed record size, header included.
    pub const fn record_size(self) -> usize {
        match self {
            Self::Clear | Self::PopClip => 8,
            Self::FillRect => 48,
            Self::DrawText => 56,
            Self::PushClip | Self::DrawTextRun | Self::DefString | Self::DefBlob => 24,
            Self::SetCursor => 20,
            Self::DrawCanvas => 40,
            Self::DrawImage => 44,
        }
    }

    /// Looks up an opcode by its wire value.
    pub const fn from_u16(value: u16) -> Option<Self> {
        Some(match value {
            1 => Self::Clear,
            2 => Self::FillRect,
            3 => Self::DrawText,
            4 => Self::PushClip,
            5 => Self::PopClip,
            6 => Self::DrawTextRun,
            7 => Self::SetCursor,
            8 => Self::DrawCanvas,
            9 => Self::DrawImage,
            10 => Self::DefString,
            12 => Self::DefBlob,
            _ => return None,
        })
    }
}

/// The decoded 64-byte header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Header {
    /// Always [`MAGIC`].
    pub magic: u32,
    /// Always [`VERSION`].
    pub version: u32,
    /// Always [`HEADER_SIZE`].
    pub header_size: u32,
    /// Size of the whole buffer.
    pub total_size: u32,
    /// Start of the command stream.
    pub cmd_offset: u32,
    /// Length of the command stream.
    pub cmd_bytes: u32,
    /// Number of command records.
    pub cmd_count: u32,
    /// Start of the string span list.
    pub strings_span_offset: u32,
    /// Number of strings.
    pub strings_count: u32,
    /// Start of the string pool.
    pub strings_bytes_offset: u32,
    /// Padded length of the string pool.
    pub strings_bytes_len: u32,
    /// Start of the blob span list.
    pub blobs_span_offset: u32,
    /// Number of blobs.
    pub blobs_count: u32,
    /// Start of the blob pool.
    pub blobs_bytes_offset: u32,
    /// Padded length of the blob pool.
    pub blobs_bytes_len: u32,
    /// Written as zero.
    pub reserved0: u32,
}

impl Header {
    const fn fields(&self) -> [u32; 16] {
        [
            self.magic,
            self.version,
            self.header_size,
            self.total_size,
            self.cmd_offset,
            self.cmd_bytes,
            self.cmd_count,
            self.strings_span_offset,
            self.strings_count,
            self.strings_bytes_offset,
            self.strings_bytes_len,
            self.blobs_span_offset,
            self.blobs_count,
            self.blobs_bytes_offset,
            self.blobs_bytes_len,
            self.reserved0,
        ]
    }

    /// Appends the header to `buf`.
    pub fn encode(&self, buf: &mut BytesMut) {
        for field in self.fields() {
            buf.put_u32_le(field);
        }
    }

    /// Reads a header from the start of `bytes`.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let reader = Reader::new(bytes);
        let field = |index: usize| reader.u32(index * 4);
        Some(Self {
            magic: field(0)?,
            version: field(1)?,
            header_size: field(2)?,
            total_size: field(3)?,
            cmd_offset: field(4)?,
            cmd_bytes: field(5)?,
            cmd_count: field(6)?,
            strings_span_offset: field(7)?,
            strings_count: field(8)?,
            strings_bytes_offset: field(9)?,
            strings_bytes_len: field(10)?,
            blobs_span_offset: field(11)?,
            blobs_count: field(12)?,
            blobs_bytes_offset: field(13)?,
            blobs_bytes_len: field(14)?,
            reserved0: field(15)?,
        })
    }
}

/// String-table references stamped into styles while a link is active.
///
/// Zero means "no string".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkRefs {
    /// String id of the URI.
    pub uri: u32,
    /// String id of the link id, or 0.
    pub id: u32,
}

/// A style as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedStyle {
    /// Foreground, `0x00RRGGBB` or the default sentinel.
    pub fg: u32,
    /// Background, `0x00RRGGBB` or the default sentinel.
    pub bg: u32,
    /// `TextAttributes` bits.
    pub attrs: u32,
    /// Underline color, `0x00RRGGBB` or the default sentinel.
    pub underline_rgb: u32,
    /// String id of the hyperlink URI, or 0.
    pub link_uri_ref: u32,
    /// String id of the hyperlink id, or 0.
    pub link_id_ref: u32,
}

impl Default for PackedStyle {
    fn default() -> Self {
        Self::pack(None, LinkRefs::default())
    }
}

impl PackedStyle {
    /// Packs an optional style with the active link references.
    pub fn pack(style: Option<&DrawStyle>, link: LinkRefs) -> Self {
        let style = style.copied().unwrap_or_default();
        Self {
            fg: pack_color(style.fg),
            bg: pack_color(style.bg),
            attrs: style.attributes.bits(),
            underline_rgb: pack_color(style.underline_color),
            link_uri_ref: link.uri,
            link_id_ref: link.id,
        }
    }

    /// Appends the 24-byte encoding to `buf`.
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u32_le(self.fg);
        buf.put_u32_le(self.bg);
        buf.put_u32_le(self.attrs);
        buf.put_u32_le(self.underline_rgb);
        buf.put_u32_le(self.link_uri_ref);
        buf.put_u32_le(self.link_id_ref);
    }

    /// Reads a packed style at `offset`.
    pub(crate) fn decode(reader: &Reader<'_>, offset: usize) -> Option<Self> {
        Some(Self {
            fg: reader.u32(offset)?,
            bg: reader.u32(offset + 4)?,
            attrs: reader.u32(offset + 8)?,
            underline_rgb: reader.u32(offset + 12)?,
            link_uri_ref: reader.u32(offset + 16)?,
            link_id_ref: reader.u32(offset + 20)?,
        })
    }
}

/// Cursor shape for `SET_CURSOR`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CursorShape {
    /// Full cell block.
    #[default]
    Block = 0,
    /// Underscore.
    Underline = 1,
    /// Vertical bar.
    Bar = 2,
}

/// How canvas pixels map onto cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Blitter {
    /// Let the backend choose.
    #[default]
    Auto = 0,
    /// 2x4 dots per cell.
    Braille = 1,
    /// 2x3 blocks per cell.
    Sextant = 2,
    /// 2x2 blocks per cell.
    Quadrant = 3,
    /// 1x2 blocks per cell.
    HalfBlock = 4,
    /// One ASCII shade per cell.
    Ascii = 5,
}

/// Encoding of an image blob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ImageFormat {
    /// Raw RGBA, 4 bytes per pixel.
    #[default]
    Rgba = 0,
    /// PNG file bytes.
    Png = 1,
}

/// Terminal image protocol requested for an image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ImageProtocol {
    /// Let the backend choose.
    #[default]
    Auto = 0,
    /// Kitty graphics protocol.
    Kitty = 1,
    /// DEC sixel.
    Sixel = 2,
    /// iTerm2 inline images.
    Iterm2 = 3,
}

/// How an image is fitted into its cell area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ImageFit {
    /// Stretch to the area.
    #[default]
    Fill = 0,
    /// Scale to fit inside, keeping aspect ratio.
    Contain = 1,
    /// Scale to cover, cropping the overflow.
    Cover = 2,
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_tui_core::style::PACKED_DEFAULT_COLOR;
    use loom_tui_core::{Rgb, TextAttributes};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_magic_spells_zrdl() {
        assert_eq!(&MAGIC.to_le_bytes(), b"ZRDL");
    }

    #[test]
    fn test_record_sizes_are_aligned() {
        for value in 0..16 {
            if let Some(op) = Opcode::from_u16(value) {
                assert_eq!(op as u16, value);
                assert_eq!(op.record_size() % 4, 0, "{op:?}");
            }
        }
        assert_eq!(Opcode::from_u16(11), None);
    }

    #[test]
    fn test_header_roundtrip() {
        let header = Header {
            magic: MAGIC,
            version: VERSION,
            header_size: 64,
            total_size: 128,
            cmd_count: 3,
            ..Header::default()
        };
        let mut buf = BytesMut::new();
        header.encode(&mut buf);
        assert_eq!(buf.len(), HEADER_SIZE);
        assert_eq!(Header::decode(&buf), Some(header));
        assert_eq!(Header::decode(&buf[..60]), None);
    }

    #[test]
    fn test_pack_style() {
        let style = DrawStyle::new().fg(Rgb::new(0x12, 0x34, 0x56)).bold();
        let packed = PackedStyle::pack(Some(&style), LinkRefs { uri: 3, id: 0 });
        assert_eq!(packed.fg, 0x0012_3456);
        assert_eq!(packed.bg, PACKED_DEFAULT_COLOR);
        assert_eq!(packed.attrs, TextAttributes::BOLD.bits());
        assert_eq!(packed.link_uri_ref, 3);

        let mut buf = BytesMut::new();
        packed.encode(&mut buf);
        assert_eq!(buf.len(), STYLE_SIZE);
        assert_eq!(PackedStyle::decode(&Reader::new(&buf), 0), Some(packed));
    }
}
