//! File-backed raster data provider.
//!
//! Stores samples as a flat native-endian file with a JSON metadata
//! sidecar. The format is private to this crate; it exists so editable-mode
//! writes have a durable store to round-trip through.

use std::fs;
use std::path::{Path, PathBuf};

use raster_common::{BoundingBox, CrsCode, GridGeometry};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::block::RasterBlock;
use crate::datatype::DataType;
use crate::error::{ProcessorError, Result};

use super::{read_native_block, write_native_block, RasterDataProvider};

/// Metadata sidecar stored next to the sample file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GridFileMeta {
    crs: CrsCode,
    extent: BoundingBox,
    width: usize,
    height: usize,
    data_type: DataType,
    no_data_value: Option<f64>,
    band_count: usize,
}

/// A provider over a raw sample file plus a JSON sidecar.
///
/// Samples live at the given path, band after band in row-major order;
/// metadata lives at the same path with a `json` extension. [`create`]
/// returns the provider already in editable mode, matching a freshly
/// created store; [`open`] starts read-only. Writes go through memory and
/// are flushed to disk immediately, so reopening after a write session sees
/// the written samples.
///
/// [`create`]: GridFileProvider::create
/// [`open`]: GridFileProvider::open
pub struct GridFileProvider {
    data_path: PathBuf,
    meta: GridFileMeta,
    geometry: GridGeometry,
    bands: Vec<Vec<u8>>,
    editable: bool,
}

impl GridFileProvider {
    /// Create a new zero-filled store on disk, open in editable mode.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        path: impl AsRef<Path>,
        crs: CrsCode,
        extent: BoundingBox,
        data_type: DataType,
        width: usize,
        height: usize,
        band_count: usize,
        no_data_value: Option<f64>,
    ) -> Result<Self> {
        if width == 0 || height == 0 || band_count == 0 {
            return Err(ProcessorError::invalid_metadata(format!(
                "cannot create a {}x{} store with {} bands",
                width, height, band_count
            )));
        }

        let meta = GridFileMeta {
            crs,
            extent,
            width,
            height,
            data_type,
            no_data_value,
            band_count,
        };

        let band_len = width * height * data_type.size();
        let provider = Self {
            data_path: path.as_ref().to_path_buf(),
            geometry: GridGeometry::new(extent, width, height),
            bands: vec![vec![0u8; band_len]; band_count],
            meta,
            editable: true,
        };
        provider.flush()?;
        debug!(path = %provider.data_path.display(), "created grid store");
        Ok(provider)
    }

    /// Open an existing store read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data_path = path.as_ref().to_path_buf();
        let meta_json = fs::read_to_string(meta_path(&data_path))?;
        let meta: GridFileMeta = serde_json::from_str(&meta_json)?;

        let band_len = meta.width * meta.height * meta.data_type.size();
        if band_len == 0 || meta.band_count == 0 {
            return Err(ProcessorError::invalid_metadata(format!(
                "{}x{} store with {} bands is degenerate",
                meta.width, meta.height, meta.band_count
            )));
        }

        let raw = fs::read(&data_path)?;
        if raw.len() != band_len * meta.band_count {
            return Err(ProcessorError::invalid_metadata(format!(
                "sample file holds {} bytes, expected {}",
                raw.len(),
                band_len * meta.band_count
            )));
        }

        let bands = raw.chunks_exact(band_len).map(<[u8]>::to_vec).collect();
        Ok(Self {
            geometry: GridGeometry::new(meta.extent, meta.width, meta.height),
            bands,
            meta,
            data_path,
            editable: false,
        })
    }

    fn flush(&self) -> Result<()> {
        let mut raw = Vec::with_capacity(self.bands.iter().map(Vec::len).sum());
        for band in &self.bands {
            raw.extend_from_slice(band);
        }
        fs::write(&self.data_path, raw)?;
        fs::write(
            meta_path(&self.data_path),
            serde_json::to_string_pretty(&self.meta)?,
        )?;
        Ok(())
    }
}

fn meta_path(data_path: &Path) -> PathBuf {
    data_path.with_extension("json")
}

impl RasterDataProvider for GridFileProvider {
    fn crs(&self) -> CrsCode {
        self.meta.crs
    }

    fn extent(&self) -> BoundingBox {
        self.meta.extent
    }

    fn width(&self) -> usize {
        self.meta.width
    }

    fn height(&self) -> usize {
        self.meta.height
    }

    fn band_count(&self) -> usize {
        self.meta.band_count
    }

    fn data_type(&self, band: usize) -> Option<DataType> {
        (band < self.meta.band_count).then_some(self.meta.data_type)
    }

    fn no_data_value(&self, band: usize) -> Option<f64> {
        if band < self.meta.band_count {
            self.meta.no_data_value
        } else {
            None
        }
    }

    fn block(&self, band: usize, extent: &BoundingBox, width: usize, height: usize) -> RasterBlock {
        let Some(band_data) = self.bands.get(band) else {
            return RasterBlock::invalid(self.meta.data_type);
        };

        read_native_block(
            &self.geometry,
            self.meta.data_type,
            self.meta.no_data_value,
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
        let data_type = self.meta.data_type;
        let Some(band_data) = self.bands.get_mut(band) else {
            return false;
        };

        let before = band_data.clone();
        if !write_native_block(&geometry, data_type, band_data, block) {
            return false;
        }

        // Write through so a dropped provider leaves the store consistent;
        // roll back on flush failure to keep false an all-or-nothing answer
        if self.flush().is_err() {
            self.bands[band] = before;
            return false;
        }
        true
    }

    fn set_editable(&mut self, enable: bool) -> bool {
        if enable == self.editable {
            return false;
        }
        if !enable && self.flush().is_err() {
            return false;
        }
        self.editable = enable;
        true
    }

    fn is_editable(&self) -> bool {
        self.editable
    }
}
