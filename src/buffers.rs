//! Strongly typed 2-D grids used as the crate's aligned raster buffers:
//! `Image`, `BlurredImage`, `IsophoteField`, `ConfidenceMap`, `DataField`,
//! `PriorityField`, and others are all `Grid<T>` over a different `T`.
//!
//! Grounded on `image_processor::ImageData` and `edge_detector::EdgeMap`:
//! both are flat row-major `Vec<_>` plus width/height with no indexing
//! abstraction. `Grid<T>` generalises that shape rather than introducing a
//! new one.

use crate::geometry::{Index, Offset, Region};

/// A row-major `width x height` grid of `T`.
#[derive(Debug, Clone)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn filled(width: u32, height: u32, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, index: Index) -> bool {
        index.row >= 0
            && index.col >= 0
            && (index.row as u32) < self.height
            && (index.col as u32) < self.width
    }

    fn flat(&self, index: Index) -> Option<usize> {
        let (row, col) = index.as_usize()?;
        if row as u32 >= self.height || col as u32 >= self.width {
            return None;
        }
        Some(row * self.width as usize + col)
    }

    pub fn get(&self, index: Index) -> Option<&T> {
        self.flat(index).map(|i| &self.data[i])
    }

    pub fn get_mut(&mut self, index: Index) -> Option<&mut T> {
        let i = self.flat(index)?;
        Some(&mut self.data[i])
    }

    /// Panics if `index` is out of bounds — used in hot paths where the
    /// caller has already validated the index against `Mask`/`Region`.
    pub fn at(&self, index: Index) -> &T {
        self.get(index).expect("index out of grid bounds")
    }

    pub fn set(&mut self, index: Index, value: T) {
        if let Some(i) = self.flat(index) {
            self.data[i] = value;
        }
    }

    /// Fill every pixel of `region` (cropped to the grid bounds) with `value`.
    pub fn fill(&mut self, region: Region, value: T) {
        let Some(cropped) = region.crop(self.width, self.height) else {
            return;
        };
        for idx in cropped.indices() {
            self.set(idx, value.clone());
        }
    }

    /// Row-major iterator over `(index, &value)` for every pixel of
    /// `region` that lies within the grid (callers may pass an uncropped
    /// region — anything outside is silently skipped).
    pub fn iter_region(&self, region: Region) -> impl Iterator<Item = (Index, &T)> {
        region.indices().filter_map(move |idx| self.get(idx).map(|v| (idx, v)))
    }

    /// Copy `self[src_origin + o]` into `self[dst_origin + o]` for every
    /// offset `o` in `offsets`. Reads are fully materialised before any
    /// write, so this is correct even when the source and destination
    /// extents overlap (the algorithm only ever copies VALID into HOLE,
    /// which never overlaps its own source, but this makes no such
    /// assumption).
    pub fn copy_offsets(&mut self, src_origin: Index, dst_origin: Index, offsets: &[Offset]) {
        let staged: Vec<(Index, T)> = offsets
            .iter()
            .filter_map(|&o| self.get(src_origin + o).map(|v| (dst_origin + o, v.clone())))
            .collect();
        for (dst, value) in staged {
            self.set(dst, value);
        }
    }

    /// Copy the entirety of `src_region` onto `dst_region` (same
    /// dimensions required). Used when no offset filtering is needed.
    pub fn copy_region(&mut self, src_region: Region, dst_region: Region) {
        debug_assert_eq!(src_region.width, dst_region.width);
        debug_assert_eq!(src_region.height, dst_region.height);
        let offsets: Vec<Offset> = src_region.offsets().collect();
        self.copy_offsets(src_region.origin, dst_region.origin, &offsets);
    }
}

/// Single-channel float grid (`DataField`, `ConfidenceMap`, `PriorityField`).
pub type ScalarField = Grid<f32>;

/// 2-vector float field (`IsophoteField`, `BoundaryNormals`).
pub type VectorField = Grid<crate::geometry::Vec2>;

/// Multi-channel float grid (`Image`, `BlurredImage`). Channel count is
/// fixed per instance and carried alongside the grid.
#[derive(Debug, Clone)]
pub struct MultiChannelField {
    pub channels: usize,
    grid: Grid<Vec<f32>>,
}

impl MultiChannelField {
    pub fn filled(width: u32, height: u32, channels: usize, value: f32) -> Self {
        Self {
            channels,
            grid: Grid::filled(width, height, vec![value; channels]),
        }
    }

    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    pub fn get(&self, index: Index) -> Option<&[f32]> {
        self.grid.get(index).map(|v| v.as_slice())
    }

    pub fn set(&mut self, index: Index, value: &[f32]) {
        debug_assert_eq!(value.len(), self.channels);
        self.grid.set(index, value.to_vec());
    }

    pub fn fill(&mut self, region: Region, value: &[f32]) {
        self.grid.fill(region, value.to_vec());
    }

    pub fn copy_offsets(&mut self, src_origin: Index, dst_origin: Index, offsets: &[Offset]) {
        self.grid.copy_offsets(src_origin, dst_origin, offsets);
    }

    pub fn iter_region(&self, region: Region) -> impl Iterator<Item = (Index, &[f32])> {
        self.grid.iter_region(region).map(|(i, v)| (i, v.as_slice()))
    }
}

/// Byte scalar grid (`BoundaryMask`, raw mask bytes at the I/O boundary).
pub type ByteField = Grid<u8>;
