//! On-the-fly reprojection of raster blocks between coordinate systems.

use raster_common::{BoundingBox, CoordinateTransform, GridGeometry, TransformDirection};
use tracing::{debug, warn};

use crate::approx::ApproxGrid;
use crate::block::RasterBlock;
use crate::config::{Precision, ProjectorConfig};
use crate::datatype::DataType;
use crate::provider::RasterDataProvider;

/// Resamples blocks from a source provider into a destination grid in a
/// different CRS.
///
/// Each [`block`] call is self-contained and synchronous: it builds a fresh
/// approximation mesh, performs exactly one bulk read from the provider and
/// assembles the destination block. Nothing is cached across calls, so
/// identical calls against an unmodified source are bit-identical.
///
/// Failures follow the block-state model rather than `Result`: a provider
/// or anchor-transform failure yields an *invalid* block, while a request
/// with no overlap yields a *valid*, entirely no-data block.
///
/// [`block`]: RasterProjector::block
pub struct RasterProjector<'a> {
    input: &'a dyn RasterDataProvider,
    transform: &'a dyn CoordinateTransform,
    config: ProjectorConfig,
}

impl<'a> RasterProjector<'a> {
    /// Create a projector with the default configuration.
    ///
    /// The transform's `Forward` direction must map from the provider's CRS
    /// to the destination CRS.
    pub fn new(input: &'a dyn RasterDataProvider, transform: &'a dyn CoordinateTransform) -> Self {
        Self::with_config(input, transform, ProjectorConfig::default())
    }

    /// Create a projector with an explicit configuration.
    pub fn with_config(
        input: &'a dyn RasterDataProvider,
        transform: &'a dyn CoordinateTransform,
        config: ProjectorConfig,
    ) -> Self {
        Self {
            input,
            transform,
            config,
        }
    }

    /// Reproject one band into a destination grid.
    ///
    /// `dest_extent` is expressed in the transform's destination CRS; the
    /// result has exactly `dest_width` x `dest_height` pixels, sampled
    /// nearest-neighbor from one bulk source read. Destination pixels whose
    /// source location falls outside the fetched source block are no-data.
    pub fn block(
        &self,
        band: usize,
        dest_extent: &BoundingBox,
        dest_width: usize,
        dest_height: usize,
    ) -> RasterBlock {
        let Some(data_type) = self.input.data_type(band) else {
            warn!(band, "projector asked for a band the provider lacks");
            return RasterBlock::invalid(DataType::Float64);
        };

        if self.transform.source_crs() != self.input.crs() {
            warn!(
                expected = %self.transform.source_crs(),
                actual = %self.input.crs(),
                "transform does not start at the input CRS"
            );
            return RasterBlock::invalid(data_type);
        }

        // Same CRS: nothing to reproject, forward the request
        if self.transform.source_crs() == self.transform.dest_crs() {
            return self.input.block(band, dest_extent, dest_width, dest_height);
        }

        if dest_width == 0 || dest_height == 0 {
            return RasterBlock::new(data_type, dest_width, dest_height);
        }

        let dest = GridGeometry::new(*dest_extent, dest_width, dest_height);

        let mesh = match self.config.precision {
            Precision::Approximate => {
                match ApproxGrid::build(self.transform, dest, &self.config) {
                    Ok(mesh) => Some(mesh),
                    Err(err) => {
                        warn!(%err, "anchor transform failed; result cannot be trusted");
                        return RasterBlock::invalid(data_type);
                    }
                }
            }
            Precision::Exact => None,
        };

        let source_bounds = match &mesh {
            Some(mesh) => mesh.source_bounds(),
            None => match self
                .transform
                .transform_bounding_box(dest_extent, TransformDirection::Inverse)
            {
                Ok(bounds) => bounds,
                Err(err) => {
                    warn!(%err, "destination extent does not transform; result cannot be trusted");
                    return RasterBlock::invalid(data_type);
                }
            },
        };

        let no_data = self
            .input
            .no_data_value(band)
            .unwrap_or_else(|| data_type.default_no_data_value());

        let native = GridGeometry::new(
            self.input.extent(),
            self.input.width(),
            self.input.height(),
        );

        // One native pixel of margin for the sampling kernel
        let source_bounds = source_bounds.expanded(native.x_res(), native.y_res());

        let Some(read_extent) = source_bounds.intersection(&self.input.extent()) else {
            // No overlap with the source: valid and entirely no-data
            let mut out = RasterBlock::with_no_data(data_type, dest_width, dest_height, no_data);
            out.fill_no_data();
            return out;
        };

        // One bulk read at the source's native resolution over the clamped
        // box; every destination pixel is answered from this block.
        let src_cols =
            ((read_extent.width() / native.x_res()).ceil() as usize).clamp(1, self.input.width());
        let src_rows =
            ((read_extent.height() / native.y_res()).ceil() as usize).clamp(1, self.input.height());

        let src_block = self.input.block(band, &read_extent, src_cols, src_rows);
        if !src_block.is_valid() {
            warn!(band, "source provider returned an invalid block");
            return RasterBlock::invalid(data_type);
        }
        debug!(src_cols, src_rows, "fetched source block for reprojection");

        let src = GridGeometry::new(read_extent, src_cols, src_rows);
        let mut out = RasterBlock::with_no_data(data_type, dest_width, dest_height, no_data);

        for row in 0..dest_height {
            let py = row as f64 + 0.5;
            for col in 0..dest_width {
                let px = col as f64 + 0.5;

                let coord = match &mesh {
                    Some(mesh) => mesh.source_coord(px, py),
                    None => self
                        .transform
                        .transform(dest.x_at(px), dest.y_at(py), TransformDirection::Inverse)
                        .ok(),
                };

                let Some((sx, sy)) = coord else {
                    out.set_no_data(row, col);
                    continue;
                };

                let (Some(src_col), Some(src_row)) = (src.col_at(sx), src.row_at(sy)) else {
                    out.set_no_data(row, col);
                    continue;
                };

                let sample = src_block.value_and_no_data(src_row, src_col);
                if sample.is_no_data {
                    out.set_no_data(row, col);
                } else {
                    out.set_value(row, col, sample.value);
                }
            }
        }

        out
    }
}
