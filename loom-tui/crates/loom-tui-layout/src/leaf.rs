//! Intrinsic sizes of leaf widgets.

use loom_tui_core::{Fatal, Result, Size, WidgetKind};
use unicode_width::UnicodeWidthStr;

use crate::axis::Axis;

/// Measures text by display columns.
///
/// Each `\n` starts a new line; the width is that of the widest line. Text is
/// never wrapped here, so narrow constraints truncate rather than reflow.
pub fn measure_text(text: &str) -> Size {
    let mut width = 0usize;
    let mut lines = 0usize;
    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        width = width.max(line.width());
        lines += 1;
    }
    Size::new(saturate(width), saturate(lines))
}

/// A spacer extends `size` cells along the parent's main axis.
pub fn measure_spacer(size: i32, axis: Axis) -> Result<Size> {
    if size < 0 {
        return Err(Fatal::invalid_props(
            WidgetKind::Spacer,
            "size",
            format!("must be non-negative, got {size}"),
        ));
    }
    Ok(axis.size(size, 0))
}

/// A divider is one cell thick and spans the parent's cross axis.
pub fn measure_divider(max: Size, axis: Axis) -> Size {
    axis.size(1, axis.cross(max))
}

fn saturate(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_width_uses_display_columns() {
        assert_eq!(measure_text("hello"), Size::new(5, 1));
        assert_eq!(measure_text("日本"), Size::new(4, 1));
        assert_eq!(measure_text(""), Size::new(0, 1));
    }

    #[test]
    fn test_multiline_text() {
        assert_eq!(measure_text("ab\nlonger\r\nc"), Size::new(6, 3));
    }

    #[test]
    fn test_spacer_follows_axis() {
        assert_eq!(measure_spacer(3, Axis::Row).unwrap(), Size::new(3, 0));
        assert_eq!(measure_spacer(3, Axis::Column).unwrap(), Size::new(0, 3));
        assert!(measure_spacer(-1, Axis::Row).is_err());
    }

    #[test]
    fn test_divider_spans_cross_axis() {
        let max = Size::new(20, 10);
        assert_eq!(measure_divider(max, Axis::Column), Size::new(20, 1));
        assert_eq!(measure_divider(max, Axis::Row), Size::new(1, 10));
    }
}
