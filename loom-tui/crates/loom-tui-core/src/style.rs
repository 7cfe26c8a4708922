//! Draw styles for terminal UI rendering.
//!
//! This module provides the style values that the render step hands to the
//! drawlist builder. The main types are:
//!
//! - [`Rgb`]: A 24-bit color
//! - [`TextAttributes`]: Bitflags for text decorations, laid out as on the wire
//! - [`DrawStyle`]: Colors, attributes and underline color for one draw call
//!
//! Styles are resolved by the theme layer before they reach this crate; the
//! core only packs them into fixed-width fields.
//!
//! # Examples
//!
//! ```
//! use loom_tui_core::style::{DrawStyle, Rgb, TextAttributes};
//!
//! let error_style = DrawStyle::new()
//!     .fg(Rgb::new(255, 0, 0))
//!     .bold();
//!
//! let base = DrawStyle::new().bg(Rgb::new(0, 0, 0));
//! let combined = base.merge(&error_style);
//! assert_eq!(combined.bg, Some(Rgb::new(0, 0, 0)));
//! assert!(combined.attributes.contains(TextAttributes::BOLD));
//! ```

use bitflags::bitflags;
use std::fmt;

/// Packed value meaning "terminal default color".
///
/// Packed colors use the low 24 bits for `0xRRGGBB`; this sentinel sets bit 24,
/// which no RGB value can.
pub const PACKED_DEFAULT_COLOR: u32 = 0x0100_0000;

/// A 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Creates a color from its channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Returns the color packed as `0x00RRGGBB`.
    #[inline]
    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Unpacks a `0x00RRGGBB` value; the high byte is ignored.
    #[inline]
    pub const fn from_u32(packed: u32) -> Self {
        Self {
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Packs an optional color into its 4-byte wire form.
#[inline]
pub const fn pack_color(color: Option<Rgb>) -> u32 {
    match color {
        Some(rgb) => rgb.to_u32(),
        None => PACKED_DEFAULT_COLOR,
    }
}

/// Unpacks a 4-byte wire color.
#[inline]
pub const fn unpack_color(packed: u32) -> Option<Rgb> {
    if packed & PACKED_DEFAULT_COLOR != 0 {
        None
    } else {
        Some(Rgb::from_u32(packed))
    }
}

bitflags! {
    /// Text decoration attributes as a compact bitfield.
    ///
    /// The bit positions are part of the drawlist format: the `attrs` field of
    /// every packed style carries `bits()` unchanged.
    ///
    /// ```
    /// use loom_tui_core::style::TextAttributes;
    ///
    /// let attrs = TextAttributes::BOLD | TextAttributes::UNDERLINE;
    /// assert!(attrs.contains(TextAttributes::BOLD));
    /// assert!(!attrs.contains(TextAttributes::ITALIC));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextAttributes: u32 {
        /// Bold/bright text.
        const BOLD          = 1 << 0;
        /// Italic text.
        const ITALIC        = 1 << 1;
        /// Underlined text.
        const UNDERLINE     = 1 << 2;
        /// Reverse/inverse video (swap fg and bg colors).
        const INVERSE       = 1 << 3;
        /// Dim/faint text.
        const DIM           = 1 << 4;
        /// Strikethrough text.
        const STRIKETHROUGH = 1 << 5;
        /// Overlined text.
        const OVERLINE      = 1 << 6;
        /// Blinking text (rarely supported in modern terminals).
        const BLINK         = 1 << 7;
    }
}

impl fmt::Display for TextAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
        write!(f, "{}", names.join(", ").to_lowercase())
    }
}

/// Complete style information for one draw command.
///
/// `None` colors mean "use the terminal's default".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DrawStyle {
    /// Foreground (text) color.
    pub fg: Option<Rgb>,
    /// Background color.
    pub bg: Option<Rgb>,
    /// Text decoration attributes.
    pub attributes: TextAttributes,
    /// Underline color; `None` follows the foreground.
    pub underline_color: Option<Rgb>,
}

impl DrawStyle {
    /// Creates a new empty style with no colors and no attributes.
    #[inline]
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            attributes: TextAttributes::empty(),
            underline_color: None,
        }
    }

    /// Sets the foreground color.
    #[inline]
    pub const fn fg(mut self, color: Rgb) -> Self {
        self.fg = Some(color);
        self
    }

    /// Sets the background color.
    #[inline]
    pub const fn bg(mut self, color: Rgb) -> Self {
        self.bg = Some(color);
        self
    }

    /// Sets the underline color.
    #[inline]
    pub const fn underline_color(mut self, color: Rgb) -> Self {
        self.underline_color = Some(color);
        self
    }

    /// Adds attributes to the style.
    #[inline]
    pub const fn add_attributes(mut self, attrs: TextAttributes) -> Self {
        self.attributes = self.attributes.union(attrs);
        self
    }

    /// Adds the bold attribute.
    #[inline]
    pub const fn bold(self) -> Self {
        self.add_attributes(TextAttributes::BOLD)
    }

    /// Adds the italic attribute.
    #[inline]
    pub const fn italic(self) -> Self {
        self.add_attributes(TextAttributes::ITALIC)
    }

    /// Adds the underline attribute.
    #[inline]
    pub const fn underline(self) -> Self {
        self.add_attributes(TextAttributes::UNDERLINE)
    }

    /// Adds the inverse attribute.
    #[inline]
    pub const fn inverse(self) -> Self {
        self.add_attributes(TextAttributes::INVERSE)
    }

    /// Merges another style on top of this one.
    ///
    /// Colors set in `other` win; attributes are combined.
    #[inline]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            fg: other.fg.or(self.fg),
            bg: other.bg.or(self.bg),
            attributes: self.attributes | other.attributes,
            underline_color: other.underline_color.or(self.underline_color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_packing() {
        let c = Rgb::new(0x12, 0x34, 0x56);
        assert_eq!(c.to_u32(), 0x0012_3456);
        assert_eq!(Rgb::from_u32(0x0012_3456), c);
        assert_eq!(c.to_string(), "#123456");
    }

    #[test]
    fn test_pack_color_default_sentinel() {
        assert_eq!(pack_color(None), PACKED_DEFAULT_COLOR);
        assert_eq!(unpack_color(PACKED_DEFAULT_COLOR), None);
        // Black stays distinguishable from the default.
        assert_eq!(pack_color(Some(Rgb::new(0, 0, 0))), 0);
        assert_eq!(unpack_color(0), Some(Rgb::new(0, 0, 0)));
    }

    #[test]
    fn test_attribute_bits_are_stable() {
        assert_eq!(TextAttributes::BOLD.bits(), 1);
        assert_eq!(TextAttributes::UNDERLINE.bits(), 4);
        assert_eq!(TextAttributes::BLINK.bits(), 128);
    }

    #[test]
    fn test_attributes_display() {
        assert_eq!(TextAttributes::empty().to_string(), "none");
        assert_eq!(
            (TextAttributes::BOLD | TextAttributes::ITALIC).to_string(),
            "bold, italic"
        );
    }

    #[test]
    fn test_merge_prefers_other_colors() {
        let base = DrawStyle::new().fg(Rgb::new(1, 1, 1)).bg(Rgb::new(2, 2, 2));
        let patch = DrawStyle::new().fg(Rgb::new(9, 9, 9)).bold();
        let merged = base.merge(&patch);
        assert_eq!(merged.fg, Some(Rgb::new(9, 9, 9)));
        assert_eq!(merged.bg, Some(Rgb::new(2, 2, 2)));
        assert!(merged.attributes.contains(TextAttributes::BOLD));
    }
}
