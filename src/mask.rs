//! Tri-valued hole/valid/ignored mask.
//!
//! Grounded on the binary-mask idiom in
//! `vectorizer::marching_squares_contours` (a `Vec<bool>` mask with an
//! explicit "outside" padding convention), generalised from bool to a
//! three-way status.

use crate::buffers::{ByteField, Grid};
use crate::geometry::{Index, Offset, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelStatus {
    Hole,
    Valid,
    Ignored,
}

/// Byte encoding at the raster I/O boundary: 0 = HOLE, 255 = VALID,
/// anything else = IGNORED.
pub const BYTE_HOLE: u8 = 0;
pub const BYTE_VALID: u8 = 255;

#[derive(Debug, Clone)]
pub struct Mask {
    grid: Grid<PixelStatus>,
}

impl Mask {
    pub fn filled(width: u32, height: u32, status: PixelStatus) -> Self {
        Self { grid: Grid::filled(width, height, status) }
    }

    /// Build a `Mask` from a byte grid per the I/O-boundary encoding.
    pub fn from_bytes(bytes: &ByteField) -> Self {
        let mut grid = Grid::filled(bytes.width(), bytes.height(), PixelStatus::Ignored);
        for row in 0..bytes.height() as i32 {
            for col in 0..bytes.width() as i32 {
                let idx = Index::new(row, col);
                let status = match *bytes.at(idx) {
                    BYTE_HOLE => PixelStatus::Hole,
                    BYTE_VALID => PixelStatus::Valid,
                    _ => PixelStatus::Ignored,
                };
                grid.set(idx, status);
            }
        }
        Self { grid }
    }

    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    pub fn status(&self, index: Index) -> Option<PixelStatus> {
        self.grid.get(index).copied()
    }

    pub fn is_hole(&self, index: Index) -> bool {
        matches!(self.status(index), Some(PixelStatus::Hole))
    }

    pub fn is_valid(&self, index: Index) -> bool {
        matches!(self.status(index), Some(PixelStatus::Valid))
    }

    pub fn is_ignored(&self, index: Index) -> bool {
        matches!(self.status(index), Some(PixelStatus::Ignored))
    }

    /// True iff `region` lies entirely inside the image and every pixel in
    /// it is VALID.
    pub fn is_valid_region(&self, region: Region) -> bool {
        if !region.is_inside(self.grid.width(), self.grid.height()) {
            return false;
        }
        region.indices().all(|idx| self.is_valid(idx))
    }

    /// Every VALID pixel in `region` (cropped to the image).
    pub fn valid_pixels_in(&self, region: Region) -> Vec<Index> {
        let Some(cropped) = region.crop(self.grid.width(), self.grid.height()) else {
            return Vec::new();
        };
        cropped.indices().filter(|&idx| self.is_valid(idx)).collect()
    }

    /// Offsets, relative to `region.origin`, of every HOLE pixel in
    /// `region` (cropped to the image).
    pub fn hole_offsets_in(&self, region: Region) -> Vec<Offset> {
        let Some(cropped) = region.crop(self.grid.width(), self.grid.height()) else {
            return Vec::new();
        };
        cropped
            .indices()
            .filter(|&idx| self.is_hole(idx))
            .map(|idx| idx - region.origin)
            .collect()
    }

    /// Total number of HOLE pixels remaining. Used to verify the
    /// monotone-decrease invariant across steps.
    pub fn hole_count(&self) -> usize {
        (0..self.grid.height() as i32)
            .flat_map(|r| (0..self.grid.width() as i32).map(move |c| Index::new(r, c)))
            .filter(|&idx| self.is_hole(idx))
            .count()
    }

    /// HOLE -> VALID transition. No-op if `index` is not currently HOLE;
    /// the reverse transition is never defined.
    pub fn set_valid(&mut self, index: Index) {
        if let Some(status) = self.grid.get_mut(index) {
            if *status == PixelStatus::Hole {
                *status = PixelStatus::Valid;
            }
        }
    }
}
