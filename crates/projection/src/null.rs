//! Identity transform for sources already in the destination CRS.

use raster_common::{CoordinateTransform, CrsCode, RasterResult, TransformDirection};

/// A no-op transform whose source and destination CRS are the same.
#[derive(Debug, Clone, Copy)]
pub struct NullTransform {
    crs: CrsCode,
}

impl NullTransform {
    pub fn new(crs: CrsCode) -> Self {
        Self { crs }
    }
}

impl CoordinateTransform for NullTransform {
    fn source_crs(&self) -> CrsCode {
        self.crs
    }

    fn dest_crs(&self) -> CrsCode {
        self.crs
    }

    fn transform(
        &self,
        x: f64,
        y: f64,
        _direction: TransformDirection,
    ) -> RasterResult<(f64, f64)> {
        Ok((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let t = NullTransform::new(CrsCode::Epsg4326);
        assert_eq!(
            t.transform(12.5, -3.0, TransformDirection::Forward).unwrap(),
            (12.5, -3.0)
        );
        assert_eq!(
            t.transform(12.5, -3.0, TransformDirection::Inverse).unwrap(),
            (12.5, -3.0)
        );
        assert_eq!(t.source_crs(), t.dest_crs());
    }
}
