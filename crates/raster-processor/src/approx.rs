//! Control-point mesh approximating the inverse coordinate transform.
//!
//! Exact transforms dominate reprojection cost, so the mesh lays anchor
//! points over the destination pixel grid, inverse-transforms only the
//! anchors exactly, and answers per-pixel queries by bilinear interpolation
//! within the enclosing cell. Each cell is validated by transforming an
//! interpolated source coordinate forward and measuring the deviation from
//! the true destination pixel; a cell over tolerance is subdivided into
//! four, and past the maximum depth it abandons interpolation and
//! transforms its pixels exactly. Accuracy therefore degrades to "exact per
//! pixel" in pathological regions, never below it.
//!
//! Refinement runs on an explicit worklist with a per-cell depth counter,
//! so the call stack stays flat regardless of the configured depth.

use raster_common::{
    BoundingBox, CoordinateTransform, GridGeometry, RasterResult, TransformDirection,
};
use tracing::debug;

use crate::config::ProjectorConfig;

/// Interior validation samples per cell, as (u, v) cell fractions.
const VALIDATION_SAMPLES: [(f64, f64); 5] = [
    (0.5, 0.5),
    (0.25, 0.25),
    (0.75, 0.25),
    (0.25, 0.75),
    (0.75, 0.75),
];

#[derive(Debug, Clone)]
struct Cell {
    /// Bounds in destination pixel coordinates.
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    /// Exactly transformed source coordinates of the corners, in
    /// top-left, top-right, bottom-left, bottom-right order.
    corners: [(f64, f64); 4],
    depth: usize,
    /// Child cell indices after subdivision, in corner order.
    children: Option<[usize; 4]>,
    /// Interpolation abandoned; queries in this cell transform exactly.
    exact: bool,
}

/// A mesh of exactly transformed anchor points over a destination pixel
/// grid, queried for cheap source-coordinate estimates with bounded error.
///
/// Built once per projector invocation; the build is a pure function of the
/// destination geometry, the transform and the configuration.
pub struct ApproxGrid<'a> {
    transform: &'a dyn CoordinateTransform,
    dest: GridGeometry,
    nodes: Vec<Cell>,
    root_cols: usize,
    root_rows: usize,
    root_cell_width: f64,
    root_cell_height: f64,
}

impl<'a> ApproxGrid<'a> {
    /// Build the mesh over a destination grid using the inverse direction
    /// of `transform`. Fails when any anchor cannot be transformed.
    pub fn build(
        transform: &'a dyn CoordinateTransform,
        dest: GridGeometry,
        config: &ProjectorConfig,
    ) -> RasterResult<Self> {
        let spacing = config.anchor_spacing.max(2);
        let root_cols = ((dest.cols + spacing - 1) / spacing).max(1);
        let root_rows = ((dest.rows + spacing - 1) / spacing).max(1);
        let cell_width = dest.cols as f64 / root_cols as f64;
        let cell_height = dest.rows as f64 / root_rows as f64;

        // Anchor lattice including the extent corners
        let mut anchors = Vec::with_capacity((root_rows + 1) * (root_cols + 1));
        for j in 0..=root_rows {
            for i in 0..=root_cols {
                let px = i as f64 * cell_width;
                let py = j as f64 * cell_height;
                anchors.push(exact_source(transform, &dest, px, py)?);
            }
        }

        let mut nodes = Vec::with_capacity(root_cols * root_rows);
        let anchor = |j: usize, i: usize| anchors[j * (root_cols + 1) + i];
        for j in 0..root_rows {
            for i in 0..root_cols {
                nodes.push(Cell {
                    x0: i as f64 * cell_width,
                    y0: j as f64 * cell_height,
                    x1: (i + 1) as f64 * cell_width,
                    y1: (j + 1) as f64 * cell_height,
                    corners: [
                        anchor(j, i),
                        anchor(j, i + 1),
                        anchor(j + 1, i),
                        anchor(j + 1, i + 1),
                    ],
                    depth: 0,
                    children: None,
                    exact: false,
                });
            }
        }

        let mut grid = Self {
            transform,
            dest,
            nodes,
            root_cols,
            root_rows,
            root_cell_width: cell_width,
            root_cell_height: cell_height,
        };
        grid.refine(config)?;
        Ok(grid)
    }

    /// Subdivide over-tolerance cells until they validate, bottom out at
    /// `max_depth`, or shrink to single-pixel size.
    fn refine(&mut self, config: &ProjectorConfig) -> RasterResult<()> {
        let initial = self.nodes.len();
        let mut exact_cells = 0usize;
        let mut work: Vec<usize> = (0..self.nodes.len()).collect();

        while let Some(idx) = work.pop() {
            if self.cell_within_tolerance(idx, config.tolerance_px) {
                continue;
            }

            let (depth, too_small) = {
                let cell = &self.nodes[idx];
                (
                    cell.depth,
                    cell.x1 - cell.x0 <= 1.0 || cell.y1 - cell.y0 <= 1.0,
                )
            };

            if depth >= config.max_depth || too_small {
                self.nodes[idx].exact = true;
                exact_cells += 1;
                continue;
            }

            let children = self.subdivide(idx)?;
            self.nodes[idx].children = Some(children);
            work.extend_from_slice(&children);
        }

        debug!(
            cells = self.nodes.len(),
            refined = self.nodes.len() - initial,
            exact_cells,
            "approximation mesh built"
        );
        Ok(())
    }

    /// Validate interpolation inside a cell: every sample's interpolated
    /// source coordinate, transformed forward, must land within the pixel
    /// tolerance of the true destination pixel.
    fn cell_within_tolerance(&self, idx: usize, tolerance_px: f64) -> bool {
        let cell = &self.nodes[idx];
        for (u, v) in VALIDATION_SAMPLES {
            let px = cell.x0 + u * (cell.x1 - cell.x0);
            let py = cell.y0 + v * (cell.y1 - cell.y0);
            let (sx, sy) = interpolate(cell, px, py);

            match self
                .transform
                .transform(sx, sy, TransformDirection::Forward)
            {
                Ok((mx, my)) => {
                    let ex = self.dest.pixel_x(mx) - px;
                    let ey = self.dest.pixel_y(my) - py;
                    // NaN deviations fail the comparison and force a refine
                    if !(ex.hypot(ey) <= tolerance_px) {
                        return false;
                    }
                }
                Err(_) => return false,
            }
        }
        true
    }

    /// Split a cell into four children, exactly transforming the five new
    /// anchors (center and edge midpoints).
    fn subdivide(&mut self, idx: usize) -> RasterResult<[usize; 4]> {
        let (x0, y0, x1, y1, [tl, tr, bl, br], depth) = {
            let cell = &self.nodes[idx];
            (cell.x0, cell.y0, cell.x1, cell.y1, cell.corners, cell.depth)
        };
        let mx = (x0 + x1) / 2.0;
        let my = (y0 + y1) / 2.0;

        let top = exact_source(self.transform, &self.dest, mx, y0)?;
        let bottom = exact_source(self.transform, &self.dest, mx, y1)?;
        let left = exact_source(self.transform, &self.dest, x0, my)?;
        let right = exact_source(self.transform, &self.dest, x1, my)?;
        let center = exact_source(self.transform, &self.dest, mx, my)?;

        let child = |x0, y0, x1, y1, corners| Cell {
            x0,
            y0,
            x1,
            y1,
            corners,
            depth: depth + 1,
            children: None,
            exact: false,
        };

        let base = self.nodes.len();
        self.nodes.push(child(x0, y0, mx, my, [tl, top, left, center]));
        self.nodes.push(child(mx, y0, x1, my, [top, tr, center, right]));
        self.nodes.push(child(x0, my, mx, y1, [left, center, bl, bottom]));
        self.nodes.push(child(mx, my, x1, y1, [center, right, bottom, br]));
        Ok([base, base + 1, base + 2, base + 3])
    }

    /// Estimated source coordinate of a destination pixel coordinate.
    ///
    /// Returns `None` only when the pixel falls in an exact cell and the
    /// transform fails for it; that pixel has no source location.
    pub fn source_coord(&self, px: f64, py: f64) -> Option<(f64, f64)> {
        let ci = ((px / self.root_cell_width) as usize).min(self.root_cols - 1);
        let cj = ((py / self.root_cell_height) as usize).min(self.root_rows - 1);

        let mut idx = cj * self.root_cols + ci;
        while let Some(children) = self.nodes[idx].children {
            let cell = &self.nodes[idx];
            let right = px >= (cell.x0 + cell.x1) / 2.0;
            let bottom = py >= (cell.y0 + cell.y1) / 2.0;
            idx = children[(bottom as usize) * 2 + right as usize];
        }

        let cell = &self.nodes[idx];
        if cell.exact {
            self.transform
                .transform(
                    self.dest.x_at(px),
                    self.dest.y_at(py),
                    TransformDirection::Inverse,
                )
                .ok()
        } else {
            Some(interpolate(cell, px, py))
        }
    }

    /// Enclosing source-coordinate bounds of every anchor in the mesh.
    pub fn source_bounds(&self) -> BoundingBox {
        let mut bbox = BoundingBox::empty();
        for cell in &self.nodes {
            for (x, y) in cell.corners {
                bbox.include(x, y);
            }
        }
        bbox
    }
}

fn exact_source(
    transform: &dyn CoordinateTransform,
    dest: &GridGeometry,
    px: f64,
    py: f64,
) -> RasterResult<(f64, f64)> {
    transform.transform(dest.x_at(px), dest.y_at(py), TransformDirection::Inverse)
}

fn interpolate(cell: &Cell, px: f64, py: f64) -> (f64, f64) {
    let u = (px - cell.x0) / (cell.x1 - cell.x0);
    let v = (py - cell.y0) / (cell.y1 - cell.y0);
    let [tl, tr, bl, br] = cell.corners;

    let x = tl.0 * (1.0 - u) * (1.0 - v) + tr.0 * u * (1.0 - v) + bl.0 * (1.0 - u) * v + br.0 * u * v;
    let y = tl.1 * (1.0 - u) * (1.0 - v) + tr.1 * u * (1.0 - v) + bl.1 * (1.0 - u) * v + br.1 * u * v;
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use projection::{NullTransform, WebMercator};
    use raster_common::{CrsCode, RasterError};

    fn mercator_dest() -> GridGeometry {
        // A 512x512 Web Mercator window over central Europe
        GridGeometry::new(
            BoundingBox::new(600000.0, 5800000.0, 1800000.0, 7000000.0),
            512,
            512,
        )
    }

    #[test]
    fn test_identity_mesh_is_exact() {
        let transform = NullTransform::new(CrsCode::Epsg4326);
        let dest = GridGeometry::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0), 100, 100);
        let mesh = ApproxGrid::build(&transform, dest, &ProjectorConfig::default()).unwrap();

        let (sx, sy) = mesh.source_coord(10.5, 20.5).unwrap();
        assert!((sx - dest.x_at(10.5)).abs() < 1e-9);
        assert!((sy - dest.y_at(20.5)).abs() < 1e-9);
    }

    #[test]
    fn test_mercator_error_bound() {
        let transform = WebMercator::new();
        let dest = mercator_dest();
        let config = ProjectorConfig::default();
        let mesh = ApproxGrid::build(&transform, dest, &config).unwrap();

        // Forward-transforming the approximated source coordinate must land
        // within a small pixel deviation everywhere, not just at anchors.
        let mut max_err: f64 = 0.0;
        for row in (0..512).step_by(17) {
            for col in (0..512).step_by(17) {
                let px = col as f64 + 0.5;
                let py = row as f64 + 0.5;
                let (sx, sy) = mesh.source_coord(px, py).unwrap();
                let (mx, my) = transform
                    .transform(sx, sy, TransformDirection::Forward)
                    .unwrap();
                let err = (dest.pixel_x(mx) - px).hypot(dest.pixel_y(my) - py);
                max_err = max_err.max(err);
            }
        }
        assert!(max_err < 0.5, "max deviation {} px", max_err);
    }

    #[test]
    fn test_mesh_is_deterministic() {
        let transform = WebMercator::new();
        let dest = mercator_dest();
        let config = ProjectorConfig::default();

        let a = ApproxGrid::build(&transform, dest, &config).unwrap();
        let b = ApproxGrid::build(&transform, dest, &config).unwrap();

        for row in (0..512).step_by(31) {
            for col in (0..512).step_by(31) {
                let px = col as f64 + 0.5;
                let py = row as f64 + 0.5;
                assert_eq!(a.source_coord(px, py), b.source_coord(px, py));
            }
        }
    }

    #[test]
    fn test_source_bounds_cover_the_window() {
        let transform = WebMercator::new();
        let dest = mercator_dest();
        let mesh = ApproxGrid::build(&transform, dest, &ProjectorConfig::default()).unwrap();

        let bounds = mesh.source_bounds();
        // The window corners must fall inside the anchor bounds
        for (px, py) in [(0.0, 0.0), (512.0, 0.0), (0.0, 512.0), (512.0, 512.0)] {
            let (sx, sy) = transform
                .transform(dest.x_at(px), dest.y_at(py), TransformDirection::Inverse)
                .unwrap();
            assert!(bounds.contains_point(sx, sy));
        }
    }

    /// A transform with a high-frequency wobble that bilinear interpolation
    /// cannot follow at coarse cell sizes.
    struct Wavy;

    impl Wavy {
        const AMPLITUDE: f64 = 40.0;
        const FREQUENCY: f64 = 0.11;
    }

    impl CoordinateTransform for Wavy {
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
        ) -> Result<(f64, f64), RasterError> {
            let wobble = Self::AMPLITUDE * (x * Self::FREQUENCY).sin();
            match direction {
                TransformDirection::Forward => Ok((x, y + wobble)),
                TransformDirection::Inverse => Ok((x, y - wobble)),
            }
        }
    }

    #[test]
    fn test_pathological_transform_falls_back_to_exact() {
        let dest = GridGeometry::new(BoundingBox::new(0.0, 0.0, 512.0, 512.0), 512, 512);
        let config = ProjectorConfig::default();
        let mesh = ApproxGrid::build(&Wavy, dest, &config).unwrap();

        let exact_cells = mesh.nodes.iter().filter(|c| c.exact).count();
        assert!(exact_cells > 0, "wobble should defeat interpolation");

        // The fallback keeps the worst-case deviation tightly bounded even
        // though interpolation cannot follow the wobble.
        for row in (0..512).step_by(13) {
            for col in (0..512).step_by(13) {
                let px = col as f64 + 0.5;
                let py = row as f64 + 0.5;
                let (sx, sy) = mesh.source_coord(px, py).unwrap();
                let (mx, my) = Wavy
                    .transform(sx, sy, TransformDirection::Forward)
                    .unwrap();
                let err = (dest.pixel_x(mx) - px).hypot(dest.pixel_y(my) - py);
                assert!(err < 1.0, "pixel ({}, {}) deviates by {} px", col, row, err);
            }
        }
    }

    #[test]
    fn test_refinement_depth_is_bounded() {
        let dest = GridGeometry::new(BoundingBox::new(0.0, 0.0, 512.0, 512.0), 512, 512);
        let config = ProjectorConfig::default();
        let mesh = ApproxGrid::build(&Wavy, dest, &config).unwrap();

        let max_depth = mesh.nodes.iter().map(|c| c.depth).max().unwrap();
        assert!(max_depth <= config.max_depth);
    }
}
