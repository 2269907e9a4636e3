//! Typed raster blocks and on-the-fly reprojection.
//!
//! This crate carries the raster core of raster-warp: a typed sample block
//! with per-pixel no-data semantics, providers that serve such blocks from
//! a native grid, and a projector that resamples a source grid into a
//! destination grid in a different CRS without pre-converting the dataset.
//!
//! # Architecture
//!
//! ```text
//! RasterProjector::block(band, extent, w, h)
//!      │
//!      ├─► ApproxGrid::build        (exact transforms at anchors only,
//!      │                             error-driven subdivision)
//!      │
//!      ├─► RasterDataProvider::block (one bulk read over the source
//!      │                             bounding box of the anchors)
//!      │
//!      └─► per destination pixel: ApproxGrid::source_coord
//!               │                  (bilinear, or exact past max depth)
//!               ▼
//!          nearest-neighbor sample ─► RasterBlock assembly
//! ```
//!
//! Failure never surfaces as a panic or error value from `block()`: a
//! provider or transform failure yields an *invalid* block, a request with
//! no source overlap yields a *valid*, entirely no-data block, and
//! per-pixel no-data is ordinary data.

pub mod approx;
pub mod block;
pub mod config;
pub mod datatype;
pub mod error;
pub mod format;
pub mod projector;
pub mod provider;

// Re-export commonly used types at crate root
pub use approx::ApproxGrid;
pub use block::{PixelValue, RasterBlock};
pub use config::{Precision, ProjectorConfig};
pub use datatype::DataType;
pub use error::{ProcessorError, Result};
pub use format::{print_value, print_value_f32, NumberLocale};
pub use projector::RasterProjector;
pub use provider::{GridFileProvider, MemoryRasterProvider, RasterDataProvider};
