//! In-memory raster data provider.

use raster_common::{BoundingBox, CrsCode, GridGeometry};

use crate::block::RasterBlock;
use crate::datatype::DataType;
use crate::error::{ProcessorError, Result};

use super::{read_native_block, write_native_block, RasterDataProvider};

/// A provider backed by owned sample buffers, mainly for synthetic data and
/// tests. Starts outside editable mode like any freshly opened store.
pub struct MemoryRasterProvider {
    crs: CrsCode,
    geometry: GridGeometry,
    data_type: DataType,
    no_data_value: Option<f64>,
    bands: Vec<Vec<u8>>,
    editable: bool,
}

impl MemoryRasterProvider {
    /// Create a zero-filled provider.
    pub fn new(
        crs: CrsCode,
        extent: BoundingBox,
        data_type: DataType,
        width: usize,
        height: usize,
        band_count: usize,
    ) -> Self {
        let byte_len = width * height * data_type.size();
        Self {
            crs,
            geometry: GridGeometry::new(extent, width, height),
            data_type,
            no_data_value: None,
            bands: vec![vec![0u8; byte_len]; band_count.max(1)],
            editable: false,
        }
    }

    /// Create a single-band provider from `f64` samples in row-major order.
    pub fn from_samples(
        crs: CrsCode,
        extent: BoundingBox,
        data_type: DataType,
        width: usize,
        height: usize,
        samples: &[f64],
    ) -> Result<Self> {
        if samples.len() != width * height {
            return Err(ProcessorError::invalid_metadata(format!(
                "{} samples do not fill a {}x{} grid",
                samples.len(),
                width,
                height
            )));
        }

        let mut provider = Self::new(crs, extent, data_type, width, height, 1);
        for (i, &v) in samples.iter().enumerate() {
            data_type.write(&mut provider.bands[0], i, v);
        }
        Ok(provider)
    }

    /// Declare the no-data sentinel shared by all bands.
    pub fn set_no_data_value(&mut self, no_data: Option<f64>) {
        self.no_data_value = no_data;
    }
}

impl RasterDataProvider for MemoryRasterProvider {
    fn crs(&self) -> CrsCode {
        self.crs
    }

    fn extent(&self) -> BoundingBox {
        self.geometry.extent
    }

    fn width(&self) -> usize {
        self.geometry.cols
    }

    fn height(&self) -> usize {
        self.geometry.rows
    }

    fn band_count(&self) -> usize {
        self.bands.len()
    }

    fn data_type(&self, band: usize) -> Option<DataType> {
        (band < self.bands.len()).then_some(self.data_type)
    }

    fn no_data_value(&self, band: usize) -> Option<f64> {
        if band < self.bands.len() {
            self.no_data_value
        } else {
            None
        }
    }

    fn block(&self, band: usize, extent: &BoundingBox, width: usize, height: usize) -> RasterBlock {
        let Some(band_data) = self.bands.get(band) else {
            return RasterBlock::invalid(self.data_type);
        };

        read_native_block(
            &self.geometry,
            self.data_type,
            self.no_data_value,
            band_data,
            extent,
            width,
            height,
        )
    }

    fn write_block(&mut self, block: &RasterBlock, band: usize) -> bool {
        if !self.editable {
            return false;
        }
        let geometry = self.geometry;
        let data_type = self.data_type;
        match self.bands.get_mut(band) {
            Some(band_data) => write_native_block(&geometry, data_type, band_data, block),
            None => false,
        }
    }

    fn set_editable(&mut self, enable: bool) -> bool {
        if enable == self.editable {
            return false;
        }
        self.editable = enable;
        true
    }

    fn is_editable(&self) -> bool {
        self.editable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MemoryRasterProvider {
        let samples = test_utils::create_test_grid(8, 6);
        MemoryRasterProvider::from_samples(
            CrsCode::Epsg4326,
            BoundingBox::new(0.0, 0.0, 8.0, 6.0),
            DataType::Float32,
            8,
            6,
            &samples,
        )
        .unwrap()
    }

    #[test]
    fn test_full_extent_read() {
        let p = provider();
        let block = p.block(0, &p.extent(), 8, 6);

        assert!(block.is_valid());
        assert_eq!(block.value(0, 0), 0.0);
        assert_eq!(block.value(0, 1), 1000.0);
        assert_eq!(block.value(1, 0), 1.0);
        assert_eq!(block.value(5, 7), 7005.0);
    }

    #[test]
    fn test_sub_extent_read() {
        let p = provider();
        // One-pixel window over the native pixel at col 2, row 1
        let block = p.block(0, &BoundingBox::new(2.0, 4.0, 3.0, 5.0), 1, 1);

        assert!(block.is_valid());
        assert_eq!(block.value(0, 0), 2001.0);
    }

    #[test]
    fn test_unknown_band_is_invalid() {
        let p = provider();
        assert!(!p.block(1, &p.extent(), 8, 6).is_valid());
        assert_eq!(p.data_type(1), None);
    }

    #[test]
    fn test_editable_transitions() {
        let mut p = provider();
        assert!(!p.is_editable());
        assert!(!p.set_editable(false), "no session to end");
        assert!(p.set_editable(true));
        assert!(p.is_editable());
        assert!(!p.set_editable(true), "already editable");
        assert!(p.set_editable(false));
        assert!(!p.is_editable());
    }

    #[test]
    fn test_write_requires_editable() {
        let mut p = provider();
        let block = RasterBlock::from_samples(DataType::Float32, 1, 1, &[42.0]).unwrap();

        assert!(!p.write_block(&block, 0));
        assert_eq!(p.block(0, &p.extent(), 8, 6).value(0, 0), 0.0);

        assert!(p.set_editable(true));
        assert!(p.write_block(&block, 0));
        assert_eq!(p.block(0, &p.extent(), 8, 6).value(0, 0), 42.0);
    }
}
