//! Coordinate transform seam consumed by the reprojection engine.

use crate::bbox::BoundingBox;
use crate::crs::CrsCode;
use crate::error::{RasterError, RasterResult};

/// Direction of a coordinate transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformDirection {
    /// Source CRS to destination CRS.
    Forward,
    /// Destination CRS back to source CRS.
    Inverse,
}

impl TransformDirection {
    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            TransformDirection::Forward => TransformDirection::Inverse,
            TransformDirection::Inverse => TransformDirection::Forward,
        }
    }
}

/// A stateless point transform between two coordinate reference systems.
///
/// Implementations must report failure for points outside the projection
/// domain rather than returning a garbage coordinate.
pub trait CoordinateTransform: Send + Sync {
    /// The CRS that `Forward` transforms from.
    fn source_crs(&self) -> CrsCode;

    /// The CRS that `Forward` transforms to.
    fn dest_crs(&self) -> CrsCode;

    /// Transform a single point.
    fn transform(&self, x: f64, y: f64, direction: TransformDirection) -> RasterResult<(f64, f64)>;

    /// Approximate the transformed extent of a bounding box.
    ///
    /// Transforms the four corners and the four edge midpoints and returns
    /// the enclosing rectangle. For non-affine transforms the result can be
    /// looser than optimal, which costs efficiency but never correctness.
    fn transform_bounding_box(
        &self,
        bbox: &BoundingBox,
        direction: TransformDirection,
    ) -> RasterResult<BoundingBox> {
        let (cx, cy) = bbox.center();
        let perimeter = [
            (bbox.min_x, bbox.min_y),
            (bbox.min_x, bbox.max_y),
            (bbox.max_x, bbox.min_y),
            (bbox.max_x, bbox.max_y),
            (cx, bbox.min_y),
            (cx, bbox.max_y),
            (bbox.min_x, cy),
            (bbox.max_x, cy),
        ];

        let mut out = BoundingBox::empty();
        for (x, y) in perimeter {
            let (tx, ty) = self.transform(x, y, direction)?;
            out.include(tx, ty);
        }

        if out.is_empty() {
            return Err(RasterError::invalid_extent(format!(
                "transformed extent of {:?} is degenerate",
                bbox
            )));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doubling;

    impl CoordinateTransform for Doubling {
        fn source_crs(&self) -> CrsCode {
            CrsCode::Epsg4326
        }

        fn dest_crs(&self) -> CrsCode {
            CrsCode::Epsg3857
        }

        fn transform(
            &self,
            x: f64,
            y: f64,
            direction: TransformDirection,
        ) -> RasterResult<(f64, f64)> {
            match direction {
                TransformDirection::Forward => Ok((x * 2.0, y * 2.0)),
                TransformDirection::Inverse => Ok((x / 2.0, y / 2.0)),
            }
        }
    }

    #[test]
    fn test_direction_reversed() {
        assert_eq!(
            TransformDirection::Forward.reversed(),
            TransformDirection::Inverse
        );
        assert_eq!(
            TransformDirection::Inverse.reversed(),
            TransformDirection::Forward
        );
    }

    #[test]
    fn test_default_bounding_box_transform() {
        let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        let out = Doubling
            .transform_bounding_box(&bbox, TransformDirection::Forward)
            .unwrap();

        assert_eq!(out.min_x, 2.0);
        assert_eq!(out.min_y, 4.0);
        assert_eq!(out.max_x, 6.0);
        assert_eq!(out.max_y, 8.0);
    }
}
