//! Raster data providers.
//!
//! A provider is the engine's seam to a concrete raster store. The
//! projector only ever performs one bulk [`block`] read per invocation;
//! writes go through an explicit editable-mode transaction that the caller
//! owns (it is not synchronized internally, and a provider must not be read
//! and written concurrently while editable).
//!
//! [`block`]: RasterDataProvider::block

mod file;
mod memory;

pub use file::GridFileProvider;
pub use memory::MemoryRasterProvider;

use raster_common::{BoundingBox, CrsCode, GridGeometry};

use crate::block::RasterBlock;
use crate::datatype::DataType;

/// Source of raster blocks over a native pixel grid.
pub trait RasterDataProvider: Send + Sync {
    /// CRS of the native grid.
    fn crs(&self) -> CrsCode;

    /// Extent of the native grid in map coordinates.
    fn extent(&self) -> BoundingBox;

    /// Native grid width in samples.
    fn width(&self) -> usize;

    /// Native grid height in samples.
    fn height(&self) -> usize;

    /// Number of bands. Bands are addressed 0-based.
    fn band_count(&self) -> usize;

    /// Sample type of a band, or `None` for an unknown band.
    fn data_type(&self, band: usize) -> Option<DataType>;

    /// No-data sentinel of a band, if the store declares one.
    fn no_data_value(&self, band: usize) -> Option<f64>;

    /// Read a block covering `extent` resampled to `width` x `height`.
    ///
    /// Returns an invalid block on failure (unknown band, store error).
    /// Pixels outside the native extent are no-data, so a request with no
    /// overlap yields a valid, entirely no-data block.
    fn block(&self, band: usize, extent: &BoundingBox, width: usize, height: usize) -> RasterBlock;

    /// Write a block's samples into the native grid at the top-left corner.
    ///
    /// Returns false without mutating anything unless the provider is in
    /// editable mode and the block matches the native sample type and fits
    /// the grid.
    fn write_block(&mut self, block: &RasterBlock, band: usize) -> bool;

    /// Enter or leave editable mode. Returns false when the requested
    /// transition is invalid (already in the requested state) or the store
    /// does not support writing.
    fn set_editable(&mut self, enable: bool) -> bool;

    /// Whether an edit session is active.
    fn is_editable(&self) -> bool;
}

/// Shared nearest-neighbor read used by the concrete providers: samples a
/// native band buffer into a requested extent and size, copying sample
/// bytes verbatim so reads are bit-exact.
fn read_native_block(
    native: &GridGeometry,
    data_type: DataType,
    no_data_value: Option<f64>,
    band_data: &[u8],
    extent: &BoundingBox,
    width: usize,
    height: usize,
) -> RasterBlock {
    // The request can poke outside the native extent; those pixels need a
    // representable sentinel even when the store declares none.
    let covers = native.extent.min_x <= extent.min_x
        && native.extent.min_y <= extent.min_y
        && native.extent.max_x >= extent.max_x
        && native.extent.max_y >= extent.max_y;
    let sentinel = no_data_value.or_else(|| (!covers).then(|| data_type.default_no_data_value()));

    // Aligned full-grid reads are a plain buffer copy
    if *extent == native.extent && width == native.cols && height == native.rows {
        let mut aligned = RasterBlock::from_bytes(data_type, width, height, band_data.to_vec())
            .unwrap_or_else(|_| RasterBlock::invalid(data_type));
        aligned.set_no_data_value(sentinel);
        return aligned;
    }

    let mut out = RasterBlock::new(data_type, width, height);
    out.set_no_data_value(sentinel);
    if out.is_empty() {
        return out;
    }

    let out_geom = GridGeometry::new(*extent, width, height);
    let size = data_type.size();
    let out_buf = out.data_mut();

    for row in 0..height {
        let y = out_geom.y_at(row as f64 + 0.5);
        for col in 0..width {
            let x = out_geom.x_at(col as f64 + 0.5);
            let out_offset = (row * width + col) * size;

            match (native.col_at(x), native.row_at(y)) {
                (Some(nc), Some(nr)) => {
                    let native_offset = (nr * native.cols + nc) * size;
                    out_buf[out_offset..out_offset + size]
                        .copy_from_slice(&band_data[native_offset..native_offset + size]);
                }
                _ => {
                    // Outside the native grid; sentinel is Some by
                    // construction here
                    if let Some(nd) = sentinel {
                        data_type.write(out_buf, row * width + col, nd);
                    }
                }
            }
        }
    }

    out
}

/// Shared write-at-origin used by the concrete providers. Returns false
/// without touching the buffer when the block does not fit.
fn write_native_block(
    native: &GridGeometry,
    data_type: DataType,
    band_data: &mut [u8],
    block: &RasterBlock,
) -> bool {
    if !block.is_valid()
        || block.data_type() != data_type
        || block.width() > native.cols
        || block.height() > native.rows
    {
        return false;
    }

    let size = data_type.size();
    let src = block.data();
    for row in 0..block.height() {
        let src_start = row * block.width() * size;
        let dst_start = row * native.cols * size;
        let len = block.width() * size;
        band_data[dst_start..dst_start + len].copy_from_slice(&src[src_start..src_start + len]);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_outside_extent_is_no_data() {
        let native = GridGeometry::new(BoundingBox::new(0.0, 0.0, 4.0, 4.0), 4, 4);
        let band: Vec<u8> = (0u8..16).collect();

        let out = read_native_block(
            &native,
            DataType::UInt8,
            None,
            &band,
            &BoundingBox::new(10.0, 10.0, 14.0, 14.0),
            4,
            4,
        );

        assert!(out.is_valid());
        assert!(out.has_no_data_value());
        assert!((0..16).all(|i| out.is_no_data_at(i)));
    }

    #[test]
    fn test_aligned_read_is_bit_exact() {
        let native = GridGeometry::new(BoundingBox::new(0.0, 0.0, 4.0, 4.0), 4, 4);
        let band: Vec<u8> = (0u8..16).collect();

        let out = read_native_block(
            &native,
            DataType::UInt8,
            Some(255.0),
            &band,
            &native.extent,
            4,
            4,
        );

        assert_eq!(out.data(), band.as_slice());
        assert_eq!(out.no_data_value(), Some(255.0));
    }

    #[test]
    fn test_write_at_origin() {
        let native = GridGeometry::new(BoundingBox::new(0.0, 0.0, 4.0, 4.0), 4, 4);
        let mut band = vec![0u8; 16];

        let block = RasterBlock::from_samples(DataType::UInt8, 1, 2, &[7.0, 9.0]).unwrap();
        assert!(write_native_block(&native, DataType::UInt8, &mut band, &block));

        assert_eq!(band[0], 7);
        assert_eq!(band[4], 9);
        assert!(band[1..4].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_write_rejects_mismatches() {
        let native = GridGeometry::new(BoundingBox::new(0.0, 0.0, 4.0, 4.0), 4, 4);
        let mut band = vec![0u8; 16];
        let before = band.clone();

        let wrong_type = RasterBlock::new(DataType::Int16, 2, 2);
        assert!(!write_native_block(&native, DataType::UInt8, &mut band, &wrong_type));

        let too_big = RasterBlock::new(DataType::UInt8, 5, 1);
        assert!(!write_native_block(&native, DataType::UInt8, &mut band, &too_big));

        let invalid = RasterBlock::invalid(DataType::UInt8);
        assert!(!write_native_block(&native, DataType::UInt8, &mut band, &invalid));

        assert_eq!(band, before, "rejected writes must not mutate");
    }
}
