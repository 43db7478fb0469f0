//! The rectangular domain bounding a scene.

use canopy_formats::{parse_pattern, write_pattern};
use canopy_math::Point2;

use crate::error::Result;

/// Rectangular scene footprint, always stored as (min corner, max corner).
///
/// Periodisation and the soil quad both rely on this order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pattern {
    min: Point2,
    max: Point2,
}

impl Pattern {
    /// Build a pattern from two opposite corners given in any order.
    ///
    /// Each axis is reordered independently, so `(x1, y2)-(x2, y1)` yields
    /// the same pattern as `(x1, y1)-(x2, y2)`.
    pub fn new(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Build a pattern from `(x, y)` corner tuples.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self::new(Point2::new(a.0, a.1), Point2::new(b.0, b.1))
    }

    /// Parse pattern text and canonicalize it.
    pub fn from_text(text: &str) -> Result<Self> {
        let [a, b] = parse_pattern(text)?;
        Ok(Self::new(a, b))
    }

    /// Minimum corner.
    pub fn min(&self) -> Point2 {
        self.min
    }

    /// Maximum corner.
    pub fn max(&self) -> Point2 {
        self.max
    }

    /// Area of the domain.
    pub fn area(&self) -> f64 {
        ((self.max.x - self.min.x) * (self.max.y - self.min.y)).abs()
    }

    /// Canonical pattern text: min corner, max corner, blank line.
    pub fn to_text(&self) -> String {
        write_pattern(&self.min, &self.max)
    }
}
