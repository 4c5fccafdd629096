#![warn(missing_docs)]

//! Math types for the platen toolpath engine.
//!
//! Thin wrappers around nalgebra providing domain-specific types
//! for planar toolpath geometry: points, vectors, and axis-aligned
//! rectangles on the build surface.

use nalgebra::Vector2;

/// A point on the build surface (mm).
pub type Point2 = nalgebra::Point2<f64>;

/// A point in machine space (mm).
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in the build-surface plane (mm).
pub type Vec2 = Vector2<f64>;

/// An axis-aligned rectangle on the build surface.
///
/// `min` is the lower-left corner, `max` the upper-right. All
/// coordinates are in mm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Lower-left corner.
    pub min: Point2,
    /// Upper-right corner.
    pub max: Point2,
}

impl Rect {
    /// Rectangle from its lower-left and upper-right corners.
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// Rectangle from its lower-left corner and size.
    pub fn from_origin_size(origin: Point2, size: Vec2) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    /// Extent along X.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Extent along Y.
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Size as a `(width, height)` vector.
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Center point.
    pub fn center(&self) -> Point2 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Rectangle shrunk by `d` on every side.
    ///
    /// The result may be degenerate when `d` exceeds half of either
    /// extent; callers check with [`Rect::is_degenerate`].
    pub fn inset(&self, d: f64) -> Rect {
        Rect {
            min: Point2::new(self.min.x + d, self.min.y + d),
            max: Point2::new(self.max.x - d, self.max.y - d),
        }
    }

    /// True when the rectangle encloses no area.
    pub fn is_degenerate(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }
}
