//! Common types shared across the raster-warp crates.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod grid;
pub mod transform;

pub use bbox::BoundingBox;
pub use crs::CrsCode;
pub use error::{RasterError, RasterResult};
pub use grid::GridGeometry;
pub use transform::{CoordinateTransform, TransformDirection};
