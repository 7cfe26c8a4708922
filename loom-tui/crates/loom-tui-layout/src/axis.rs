//! Main/cross axis helpers.

use loom_tui_core::{Rect, Size};

/// The main-axis orientation of a flex container.
///
/// Leaves use the axis of their nearest flex ancestor: a spacer extends along
/// it and a divider runs across it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Children flow left to right.
    Row,
    /// Children flow top to bottom.
    #[default]
    Column,
}

impl Axis {
    /// Length of `size` along this axis.
    #[inline]
    pub const fn main(self, size: Size) -> i32 {
        match self {
            Self::Row => size.w,
            Self::Column => size.h,
        }
    }

    /// Length of `size` across this axis.
    #[inline]
    pub const fn cross(self, size: Size) -> i32 {
        match self {
            Self::Row => size.h,
            Self::Column => size.w,
        }
    }

    /// Builds a size from main and cross lengths.
    #[inline]
    pub const fn size(self, main: i32, cross: i32) -> Size {
        match self {
            Self::Row => Size::new(main, cross),
            Self::Column => Size::new(cross, main),
        }
    }

    /// Main-axis start coordinate of `rect`.
    #[inline]
    pub const fn main_start(self, rect: Rect) -> i32 {
        match self {
            Self::Row => rect.x,
            Self::Column => rect.y,
        }
    }

    /// Cross-axis start coordinate of `rect`.
    #[inline]
    pub const fn cross_start(self, rect: Rect) -> i32 {
        match self {
            Self::Row => rect.y,
            Self::Column => rect.x,
        }
    }

    /// Builds a rectangle from main/cross positions and lengths.
    #[inline]
    pub const fn rect(self, main_pos: i32, cross_pos: i32, main: i32, cross: i32) -> Rect {
        match self {
            Self::Row => Rect::new(main_pos, cross_pos, main, cross),
            Self::Column => Rect::new(cross_pos, main_pos, cross, main),
        }
    }
}
