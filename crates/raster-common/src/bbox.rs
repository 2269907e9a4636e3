//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A rectangular extent in map coordinates.
///
/// For geographic CRS (EPSG:4326), coordinates are in degrees.
/// For projected CRS (EPSG:3857, etc.), coordinates are in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// An inverted box that includes nothing; grow it with [`include`].
    ///
    /// [`include`]: BoundingBox::include
    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// True when the box covers no area.
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0) || !(self.height() > 0.0)
    }

    /// Check if this bbox intersects another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Compute the intersection of two bounding boxes.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.intersects(other) {
            return None;
        }

        Some(BoundingBox {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        })
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Get the center point of the bounding box.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Grow the box to include a point.
    pub fn include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Expand the box by a buffer amount in each axis.
    pub fn expanded(&self, buffer_x: f64, buffer_y: f64) -> Self {
        Self {
            min_x: self.min_x - buffer_x,
            min_y: self.min_y - buffer_y,
            max_x: self.max_x + buffer_x,
            max_y: self.max_y + buffer_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        let c = BoundingBox::new(20.0, 20.0, 30.0, 30.0);

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));

        let intersection = a.intersection(&b).unwrap();
        assert_eq!(intersection.min_x, 5.0);
        assert_eq!(intersection.min_y, 5.0);
        assert_eq!(intersection.max_x, 10.0);
        assert_eq!(intersection.max_y, 10.0);
    }

    #[test]
    fn test_include_grows_from_empty() {
        let mut bbox = BoundingBox::empty();
        bbox.include(3.0, -2.0);
        bbox.include(-1.0, 7.0);

        assert_eq!(bbox.min_x, -1.0);
        assert_eq!(bbox.min_y, -2.0);
        assert_eq!(bbox.max_x, 3.0);
        assert_eq!(bbox.max_y, 7.0);
        assert!(!bbox.is_empty());
    }

    #[test]
    fn test_empty_box() {
        assert!(BoundingBox::empty().is_empty());
        assert!(BoundingBox::new(0.0, 0.0, 0.0, 10.0).is_empty());
        assert!(!BoundingBox::new(0.0, 0.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn test_expanded() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0).expanded(1.0, 2.0);
        assert_eq!(bbox.min_x, -1.0);
        assert_eq!(bbox.min_y, -2.0);
        assert_eq!(bbox.max_x, 11.0);
        assert_eq!(bbox.max_y, 12.0);
    }
}
