//! Points, sizes and rectangles
//!
//! All coordinates are `f64` points in a y-up space: the origin is the
//! bottom-left corner of the host view and `max_y` is the top edge.

use serde::{Deserialize, Serialize};

/// A point in host coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A width/height pair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Square size with equal sides
    pub fn square(side: f64) -> Self {
        Self::new(side, side)
    }

    /// True when either dimension is zero or negative
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }
}

/// An axis-aligned rectangle (origin is the bottom-left corner)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Rectangle at the origin covering `size`
    pub fn from_size(size: Size) -> Self {
        Self {
            origin: Point::ZERO,
            size,
        }
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    pub fn mid_x(&self) -> f64 {
        self.origin.x + self.size.width / 2.0
    }

    pub fn mid_y(&self) -> f64 {
        self.origin.y + self.size.height / 2.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.mid_x(), self.mid_y())
    }

    /// Shrink by `dx` on the left and right and `dy` on the top and bottom
    pub fn inset(&self, dx: f64, dy: f64) -> Self {
        Self::new(
            self.origin.x + dx,
            self.origin.y + dy,
            (self.size.width - dx * 2.0).max(0.0),
            (self.size.height - dy * 2.0).max(0.0),
        )
    }

    /// Largest square centred inside this rect
    pub fn centered_square(&self) -> Self {
        let side = self.size.min_side();
        Self::new(
            self.mid_x() - side / 2.0,
            self.mid_y() - side / 2.0,
            side,
            side,
        )
    }

    /// Check if this rect contains a point (edges inclusive)
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x() && p.x <= self.max_x() && p.y >= self.min_y() && p.y <= self.max_y()
    }

    /// Point at relative coordinates (0..1 on each axis)
    pub fn relative(&self, fx: f64, fy: f64) -> Point {
        Point::new(
            self.origin.x + self.size.width * fx,
            self.origin.y + self.size.height * fy,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(r.max_x(), 110.0);
        assert_eq!(r.max_y(), 70.0);
        assert_eq!(r.center(), Point::new(60.0, 45.0));
    }

    #[test]
    fn inset_never_goes_negative() {
        let r = Rect::new(0.0, 0.0, 4.0, 4.0).inset(3.0, 3.0);
        assert_eq!(r.size, Size::ZERO);
    }

    #[test]
    fn centered_square_uses_min_side() {
        let sq = Rect::new(0.0, 0.0, 120.0, 20.0).centered_square();
        assert_eq!(sq, Rect::new(50.0, 0.0, 20.0, 20.0));
    }

    #[test]
    fn relative_points() {
        let r = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(r.relative(0.5, 0.25), Point::new(50.0, 25.0));
        assert!(r.contains(r.relative(1.0, 1.0)));
        assert!(!r.contains(Point::new(101.0, 0.0)));
    }
}
