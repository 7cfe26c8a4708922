//! Geometry types for terminal UI layout and positioning.
//!
//! This module provides the geometry primitives shared by the layout engine and
//! the drawlist builder:
//! - [`Point`]: A 2D point with signed coordinates
//! - [`Size`]: A 2D size measured in cells
//! - [`Rect`]: A rectangle combining position and size
//!
//! All values are measured in character cells and use `i32` so they map directly
//! onto the 4-byte signed geometry fields of the drawlist format. Sizes produced
//! by layout are always non-negative.

use std::ops::{Add, Sub};

/// A 2D point with signed integer coordinates.
///
/// # Examples
///
/// ```
/// use loom_tui_core::geometry::Point;
///
/// let p1 = Point::new(10, 20);
/// let p2 = Point::new(5, 5);
///
/// assert_eq!(p1 + p2, Point::new(15, 25));
/// assert_eq!(p1 - p2, Point::new(5, 15));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// The x coordinate (column position).
    pub x: i32,
    /// The y coordinate (row position).
    pub y: i32,
}

impl Point {
    /// The origin point (0, 0).
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Creates a new point at the given coordinates.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns a new point offset by the given delta.
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl Add for Point {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        self.offset(rhs.x, rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x.saturating_sub(rhs.x),
            y: self.y.saturating_sub(rhs.y),
        }
    }
}

impl From<(i32, i32)> for Point {
    #[inline]
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// A 2D size in cells.
///
/// Constructors clamp negative dimensions to zero.
///
/// # Examples
///
/// ```
/// use loom_tui_core::geometry::Size;
///
/// let size = Size::new(80, 24);
/// assert_eq!(size.area(), 1920);
/// assert_eq!(Size::new(-3, 4), Size::new(0, 4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    /// The width in columns.
    pub w: i32,
    /// The height in rows.
    pub h: i32,
}

impl Size {
    /// A zero size.
    pub const ZERO: Self = Self { w: 0, h: 0 };

    /// Creates a new size, clamping negative dimensions to zero.
    #[inline]
    pub const fn new(w: i32, h: i32) -> Self {
        Self {
            w: if w < 0 { 0 } else { w },
            h: if h < 0 { 0 } else { h },
        }
    }

    /// Returns the area (width * height).
    #[inline]
    pub const fn area(self) -> i64 {
        self.w as i64 * self.h as i64
    }

    /// Returns whether either dimension is zero.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Returns the component-wise minimum of two sizes.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Self {
            w: self.w.min(other.w),
            h: self.h.min(other.h),
        }
    }

    /// Returns the component-wise maximum of two sizes.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        Self {
            w: self.w.max(other.w),
            h: self.h.max(other.h),
        }
    }
}

impl From<(i32, i32)> for Size {
    #[inline]
    fn from((w, h): (i32, i32)) -> Self {
        Self::new(w, h)
    }
}

/// A rectangle in cell coordinates.
///
/// The rectangle is defined by its top-left corner and a non-negative size.
///
/// ```text
/// (0,0) ──────► x
///   │
///   │
///   ▼
///   y
/// ```
///
/// # Examples
///
/// ```
/// use loom_tui_core::geometry::{Point, Rect};
///
/// let rect = Rect::new(10, 20, 80, 24);
/// assert_eq!(rect.right(), 90);
/// assert_eq!(rect.bottom(), 44);
/// assert!(rect.contains_point(Point::new(50, 30)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// The x coordinate of the left edge.
    pub x: i32,
    /// The y coordinate of the top edge.
    pub y: i32,
    /// The width of the rectangle.
    pub w: i32,
    /// The height of the rectangle.
    pub h: i32,
}

impl Rect {
    /// A zero-sized rectangle at the origin.
    pub const ZERO: Self = Self {
        x: 0,
        y: 0,
        w: 0,
        h: 0,
    };

    /// Creates a new rectangle, clamping negative dimensions to zero.
    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        let size = Size::new(w, h);
        Self {
            x,
            y,
            w: size.w,
            h: size.h,
        }
    }

    /// Creates a rectangle from a position and a size.
    #[inline]
    pub const fn from_point_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.w, size.h)
    }

    /// Returns the top-left corner.
    #[inline]
    pub const fn position(self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }

    /// Returns the size of the rectangle.
    #[inline]
    pub const fn size(self) -> Size {
        Size {
            w: self.w,
            h: self.h,
        }
    }

    /// Returns the x coordinate one past the right edge.
    #[inline]
    pub const fn right(self) -> i32 {
        self.x.saturating_add(self.w)
    }

    /// Returns the y coordinate one past the bottom edge.
    #[inline]
    pub const fn bottom(self) -> i32 {
        self.y.saturating_add(self.h)
    }

    /// Returns whether the rectangle has zero area.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Returns whether the point lies inside this rectangle.
    #[inline]
    pub const fn contains_point(self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Returns the intersection of this rectangle with another.
    ///
    /// Returns `None` if the rectangles do not overlap.
    #[inline]
    pub fn intersection(self, other: Self) -> Option<Self> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Self::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Returns the rectangle inset by different amounts on each side.
    ///
    /// If the inset would result in negative dimensions, the dimensions are
    /// clamped to zero.
    #[inline]
    pub const fn inset_sides(self, left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(
            self.x.saturating_add(left),
            self.y.saturating_add(top),
            self.w.saturating_sub(left).saturating_sub(right),
            self.h.saturating_sub(top).saturating_sub(bottom),
        )
    }
}

impl From<(i32, i32, i32, i32)> for Rect {
    #[inline]
    fn from((x, y, w, h): (i32, i32, i32, i32)) -> Self {
        Self::new(x, y, w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_point_ops() {
        let p1 = Point::new(10, 20);
        let p2 = Point::new(5, 5);
        assert_eq!(p1 + p2, Point::new(15, 25));
        assert_eq!(p1 - p2, Point::new(5, 15));
        assert_eq!(p1.offset(5, -3), Point::new(15, 17));
    }

    #[test]
    fn test_size_clamps_negative() {
        assert_eq!(Size::new(-1, -5), Size::ZERO);
        assert!(Size::new(0, 10).is_empty());
        assert_eq!(Size::new(3, 9).max(Size::new(4, 2)), Size::new(4, 9));
        assert_eq!(Size::new(3, 9).min(Size::new(4, 2)), Size::new(3, 2));
    }

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10, 20, 80, 24);
        assert_eq!(rect.right(), 90);
        assert_eq!(rect.bottom(), 44);
        assert_eq!(rect.size(), Size::new(80, 24));
        assert_eq!(rect.position(), Point::new(10, 20));
    }

    #[test]
    fn test_rect_contains_point() {
        let rect = Rect::new(0, 0, 10, 10);
        assert!(rect.contains_point(Point::new(0, 0)));
        assert!(rect.contains_point(Point::new(9, 9)));
        assert!(!rect.contains_point(Point::new(10, 10)));
        assert!(!rect.contains_point(Point::new(-1, 5)));
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersection(b), Some(Rect::new(5, 5, 5, 5)));
        assert_eq!(a.intersection(Rect::new(20, 20, 5, 5)), None);
    }

    #[test]
    fn test_rect_inset_sides_clamps() {
        let rect = Rect::new(0, 0, 4, 3);
        assert_eq!(rect.inset_sides(1, 1, 1, 1), Rect::new(1, 1, 2, 1));
        assert_eq!(rect.inset_sides(3, 2, 3, 2), Rect::new(3, 2, 0, 0));
    }
}
