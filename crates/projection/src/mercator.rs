//! Spherical Web Mercator projection (EPSG:4326 ↔ EPSG:3857).
//!
//! This is the spherical variant used by web mapping stacks: latitude is
//! projected on a sphere of radius 6378137 m regardless of the WGS84
//! flattening. The projection diverges at the poles, so forward transforms
//! fail for |lat| >= 90°.

use std::f64::consts::PI;

use raster_common::{CoordinateTransform, CrsCode, RasterError, RasterResult, TransformDirection};

/// Earth radius used by the spherical Web Mercator projection (meters).
const EARTH_RADIUS: f64 = 6378137.0;

/// Transform between WGS84 geographic coordinates and Web Mercator meters.
///
/// `Forward` maps (lon, lat) degrees to (x, y) meters.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl WebMercator {
    pub fn new() -> Self {
        Self
    }

    fn forward(&self, lon: f64, lat: f64) -> RasterResult<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(RasterError::transform_failed(format!(
                "non-finite coordinate ({}, {})",
                lon, lat
            )));
        }
        if lat.abs() >= 90.0 {
            return Err(RasterError::transform_failed(format!(
                "latitude {} is outside the Web Mercator domain",
                lat
            )));
        }

        let x = EARTH_RADIUS * lon.to_radians();
        let y = EARTH_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> RasterResult<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return Err(RasterError::transform_failed(format!(
                "non-finite coordinate ({}, {})",
                x, y
            )));
        }

        let lon = (x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
        Ok((lon, lat))
    }
}

impl CoordinateTransform for WebMercator {
    fn source_crs(&self) -> CrsCode {
        CrsCode::Epsg4326
    }

    fn dest_crs(&self) -> CrsCode {
        CrsCode::Epsg3857
    }

    fn transform(&self, x: f64, y: f64, direction: TransformDirection) -> RasterResult<(f64, f64)> {
        match direction {
            TransformDirection::Forward => self.forward(x, y),
            TransformDirection::Inverse => self.inverse(x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin() {
        let (x, y) = WebMercator::new().forward(0.0, 0.0).unwrap();
        assert!(x.abs() < 1e-9);
        assert!(y.abs() < 1e-9);
    }

    #[test]
    fn test_known_point() {
        // Top of the standard square Web Mercator extent
        let (x, y) = WebMercator::new().forward(180.0, 85.05112878).unwrap();
        assert!((x - 20037508.342789244).abs() < 1.0);
        assert!((y - 20037508.342789244).abs() < 1.0);
    }

    #[test]
    fn test_roundtrip() {
        let proj = WebMercator::new();
        let (x, y) = proj.forward(-94.5, 39.0).unwrap();
        let (lon, lat) = proj.inverse(x, y).unwrap();

        assert!((lon - (-94.5)).abs() < 1e-9, "lon roundtrip: {}", lon);
        assert!((lat - 39.0).abs() < 1e-9, "lat roundtrip: {}", lat);
    }

    #[test]
    fn test_pole_fails() {
        assert!(WebMercator::new().forward(0.0, 90.0).is_err());
        assert!(WebMercator::new().forward(0.0, -95.0).is_err());
        assert!(WebMercator::new().forward(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_bounding_box_transform() {
        let bbox = raster_common::BoundingBox::new(-10.0, -10.0, 10.0, 10.0);
        let out = WebMercator::new()
            .transform_bounding_box(&bbox, TransformDirection::Forward)
            .unwrap();

        // Symmetric around the origin, wider than tall is false for mercator
        // at low latitudes: x and y spans are nearly equal here.
        assert!(out.min_x < 0.0 && out.max_x > 0.0);
        assert!(out.min_y < 0.0 && out.max_y > 0.0);
        assert!((out.min_x + out.max_x).abs() < 1e-6);
        assert!((out.min_y + out.max_y).abs() < 1e-6);
    }
}
