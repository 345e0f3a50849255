//! Rectangles.

use cgmath::{EuclideanSpace, Point2, Vector2, Zero};
use std::{fmt, ops};

/// An offset in pixels. Global offsets are relative to the window’s top left corner.
pub type Offset = Point2<f64>;

/// A size in pixels.
pub type Size = Vector2<f64>;

/// A rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Rectangle origin.
    pub origin: Point2<f64>,

    /// Rectangle size.
    pub size: Vector2<f64>,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(origin: Point2<f64>, size: Vector2<f64>) -> Rect {
        Rect { origin, size }
    }

    /// Creates a new rectangle from its components.
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Rect {
        Rect {
            origin: Point2::new(x, y),
            size: Vector2::new(width, height),
        }
    }

    /// Returns a zero-sized rectangle at the origin.
    pub fn zero() -> Rect {
        Rect {
            origin: Point2::new(0., 0.),
            size: Vector2::zero(),
        }
    }

    pub fn left(&self) -> f64 {
        self.origin.x
    }

    pub fn top(&self) -> f64 {
        self.origin.y
    }

    pub fn right(&self) -> f64 {
        self.origin.x + self.size.x
    }

    pub fn bottom(&self) -> f64 {
        self.origin.y + self.size.y
    }

    pub fn width(&self) -> f64 {
        self.size.x
    }

    pub fn height(&self) -> f64 {
        self.size.y
    }

    /// Returns the center point.
    pub fn center(&self) -> Point2<f64> {
        self.origin + self.size / 2.
    }

    /// Returns true if the point is inside the rectangle.
    ///
    /// Edges are inclusive, so that a hot zone touching the pointer still counts.
    pub fn contains(&self, point: Point2<f64>) -> bool {
        point.x >= self.left()
            && point.y >= self.top()
            && point.x <= self.right()
            && point.y <= self.bottom()
    }

    /// Returns true if this rectangle lies entirely within `outer`.
    pub fn is_wrapped_by(&self, outer: Rect) -> bool {
        self.left() >= outer.left()
            && self.top() >= outer.top()
            && self.right() <= outer.right()
            && self.bottom() <= outer.bottom()
    }

    /// Returns true if the two rectangles intersect, touching edges included.
    pub fn intersects(&self, rect: Rect) -> bool {
        self.left() <= rect.right()
            && self.top() <= rect.bottom()
            && rect.left() <= self.right()
            && rect.top() <= self.bottom()
    }

    /// Returns true if the two rectangles overlap with a nonzero area.
    pub fn inner_intersects(&self, rect: Rect) -> bool {
        self.left() < rect.right()
            && self.top() < rect.bottom()
            && rect.left() < self.right()
            && rect.top() < self.bottom()
    }

    /// Returns the intersection rectangle.
    pub fn intersect(&self, rect: Rect) -> Option<Rect> {
        if !self.inner_intersects(rect) {
            return None;
        }

        let min_x = self.left().max(rect.left());
        let min_y = self.top().max(rect.top());
        let max_x = self.right().min(rect.right());
        let max_y = self.bottom().min(rect.bottom());

        Some(Rect::from_xywh(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Returns a new rectangle inset by the specified amount.
    pub fn inset(&self, horiz: f64, vert: f64) -> Rect {
        Rect::from_xywh(
            self.origin.x + horiz,
            self.origin.y + vert,
            self.size.x - 2. * horiz,
            self.size.y - 2. * vert,
        )
    }

    /// Returns a new rectangle with the given origin.
    pub fn with_origin(&self, origin: Point2<f64>) -> Rect {
        Rect {
            origin,
            size: self.size,
        }
    }

    /// Returns a new rectangle with the given size.
    pub fn with_size(&self, size: Vector2<f64>) -> Rect {
        Rect {
            origin: self.origin,
            size,
        }
    }
}

impl Default for Rect {
    fn default() -> Rect {
        Rect::zero()
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "RectT ({:.2}, {:.2}) - [{:.2} x {:.2}]",
            self.origin.x, self.origin.y, self.size.x, self.size.y
        )
    }
}

impl ops::Add<Vector2<f64>> for Rect {
    type Output = Rect;
    fn add(self, offset: Vector2<f64>) -> Rect {
        self.with_origin(self.origin + offset)
    }
}

impl ops::AddAssign<Vector2<f64>> for Rect {
    fn add_assign(&mut self, offset: Vector2<f64>) {
        self.origin += offset;
    }
}

impl ops::Sub<Vector2<f64>> for Rect {
    type Output = Rect;
    fn sub(self, offset: Vector2<f64>) -> Rect {
        self.with_origin(self.origin - offset)
    }
}

/// Converts an offset into the displacement from the origin.
pub fn to_vec(offset: Offset) -> Vector2<f64> {
    offset.to_vec()
}

/// Compares two values with a tolerance.
pub fn near_equal(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_by_is_inclusive() {
        let outer = Rect::from_xywh(0., 0., 100., 100.);
        assert!(Rect::from_xywh(0., 0., 100., 100.).is_wrapped_by(outer));
        assert!(Rect::from_xywh(10., 10., 10., 10.).is_wrapped_by(outer));
        assert!(!Rect::from_xywh(95., 10., 10., 10.).is_wrapped_by(outer));
    }

    #[test]
    fn touching_rects_intersect_but_do_not_overlap() {
        let a = Rect::from_xywh(0., 0., 10., 10.);
        let b = Rect::from_xywh(10., 0., 10., 10.);
        assert!(a.intersects(b));
        assert!(!a.inner_intersects(b));
        assert_eq!(a.intersect(b), None);
    }

    #[test]
    fn offset_arithmetic() {
        let mut rect = Rect::from_xywh(5., 5., 10., 10.);
        rect += Vector2::new(3., -2.);
        assert_eq!(rect, Rect::from_xywh(8., 3., 10., 10.));
        assert_eq!(rect - Vector2::new(8., 3.), Rect::from_xywh(0., 0., 10., 10.));
    }
}
