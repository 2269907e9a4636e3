//! Lambert Conformal Conic projection.
//!
//! Maps a cone tangent or secant to the Earth's surface onto a flat plane.
//! The spherical form is used, matching the sphere radius conventions of
//! meteorological grids.
//!
//! The projection parameters are:
//! - Reference latitude (lat0): the latitude of the origin
//! - Reference longitude (lon0): the central meridian
//! - Standard parallel(s): latin1 and latin2 (equal for a tangent cone)

use std::f64::consts::PI;

use raster_common::{CoordinateTransform, CrsCode, RasterError, RasterResult, TransformDirection};

/// Lambert Conformal Conic projection between WGS84 geographic coordinates
/// and projected meters relative to the cone origin.
///
/// `Forward` maps (lon, lat) degrees to (x, y) meters.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Central meridian in radians
    lon0: f64,
    /// Earth radius (meters)
    earth_radius: f64,
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at the reference latitude
    rho0: f64,
}

impl LambertConformal {
    /// Create a new Lambert Conformal projection.
    ///
    /// # Arguments
    /// * `lat0_deg` - Reference latitude of the origin (degrees)
    /// * `lon0_deg` - Central meridian (degrees)
    /// * `latin1_deg` - First standard parallel (degrees)
    /// * `latin2_deg` - Second standard parallel (degrees)
    pub fn new(lat0_deg: f64, lon0_deg: f64, latin1_deg: f64, latin2_deg: f64) -> Self {
        let lat0 = lat0_deg.to_radians();
        let lon0 = lon0_deg.to_radians();
        let latin1 = latin1_deg.to_radians();
        let latin2 = latin2_deg.to_radians();

        // Mean Earth radius shared by the NWP grids this projection serves
        let earth_radius = 6371229.0;

        // Compute cone constant n
        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            latin1.sin()
        } else {
            // Secant cone (two standard parallels)
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        // Compute F constant
        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;

        // Rho at the reference latitude
        let rho0 = earth_radius * f / (PI / 4.0 + lat0 / 2.0).tan().powf(n);

        Self {
            lon0,
            earth_radius,
            n,
            f,
            rho0,
        }
    }

    /// Standard CONUS parameters (origin 23°N 96°W, parallels 29.5°N/45.5°N).
    pub fn conus() -> Self {
        Self::new(23.0, -96.0, 29.5, 45.5)
    }

    fn forward(&self, lon_deg: f64, lat_deg: f64) -> RasterResult<(f64, f64)> {
        if !lon_deg.is_finite() || !lat_deg.is_finite() || lat_deg.abs() >= 90.0 {
            return Err(RasterError::transform_failed(format!(
                "({}, {}) is outside the Lambert Conformal domain",
                lon_deg, lat_deg
            )));
        }

        let lat = lat_deg.to_radians();
        let lon = lon_deg.to_radians();

        // Normalize longitude difference to [-π, π]
        let mut dlon = lon - self.lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        let rho = self.earth_radius * self.f / (PI / 4.0 + lat / 2.0).tan().powf(self.n);
        if !rho.is_finite() {
            return Err(RasterError::transform_failed(format!(
                "latitude {} projects to a degenerate radius",
                lat_deg
            )));
        }

        let theta = self.n * dlon;
        let x = rho * theta.sin();
        let y = self.rho0 - rho * theta.cos();
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> RasterResult<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return Err(RasterError::transform_failed(format!(
                "non-finite coordinate ({}, {})",
                x, y
            )));
        }

        let rho = (x * x + (self.rho0 - y) * (self.rho0 - y)).sqrt();
        let rho = if self.n < 0.0 { -rho } else { rho };

        if rho == 0.0 {
            // The cone apex maps to the pole on the cone's side
            let lat = if self.n > 0.0 { 90.0 } else { -90.0 };
            return Ok((self.lon0.to_degrees(), lat));
        }

        let theta = x.atan2(self.rho0 - y);

        let lat = 2.0 * ((self.earth_radius * self.f / rho).powf(1.0 / self.n)).atan() - PI / 2.0;
        let lon = self.lon0 + theta / self.n;

        Ok((lon.to_degrees(), lat.to_degrees()))
    }
}

impl CoordinateTransform for LambertConformal {
    fn source_crs(&self) -> CrsCode {
        CrsCode::Epsg4326
    }

    fn dest_crs(&self) -> CrsCode {
        CrsCode::Epsg5070
    }

    fn transform(&self, x: f64, y: f64, direction: TransformDirection) -> RasterResult<(f64, f64)> {
        match direction {
            TransformDirection::Forward => self.forward(x, y),
            TransformDirection::Inverse => self.inverse(x, y),
        }
    }
}
