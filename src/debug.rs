//! Optional per-iteration debug artefacts and the JSON history dump.
//! Nothing here is read back by the engine; this module only observes.
//!
//! Grounded on the PNG-writing path of `image_processor.rs`/`main.rs` for
//! the image half, and `mcp.rs`'s use of `serde`/`serde_json` for the JSON
//! half — the only other place that serializes anything, kept here at the
//! same kind of output-only boundary rather than threaded through the
//! core engine types.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::buffers::MultiChannelField;
use crate::engine::IterationRecord;
use crate::geometry::{Index, Region};
use crate::mask::Mask;

/// Writes `iter_N_source.png`, `iter_N_target.png`, `iter_N_mask.png`
/// into `output_dir` for every iteration passed to `write_iteration`,
/// when enabled. Disabled by default: the CLI turns it on with a flag.
pub struct DebugWriter {
    output_dir: PathBuf,
    enabled: bool,
}

impl DebugWriter {
    pub fn new(output_dir: impl Into<PathBuf>, enabled: bool) -> Self {
        Self { output_dir: output_dir.into(), enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Crop and write the source/target patches and the current mask for
    /// one completed iteration. No-op when disabled.
    pub fn write_iteration(&self, iteration: u32, image: &MultiChannelField, mask: &Mask, source: Region, target: Region) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        fs::create_dir_all(&self.output_dir)?;
        self.write_patch_png(image, source, &format!("iter_{iteration}_source.png"))?;
        self.write_patch_png(image, target, &format!("iter_{iteration}_target.png"))?;
        self.write_mask_png(mask, &format!("iter_{iteration}_mask.png"))?;
        Ok(())
    }

    fn write_patch_png(&self, image: &MultiChannelField, region: Region, filename: &str) -> Result<()> {
        let mut buf = image::RgbImage::new(region.width, region.height);
        for (dx, dy, pixel) in buf.enumerate_pixels_mut() {
            let idx = Index::new(region.origin.row + dy as i32, region.origin.col + dx as i32);
            let values = image.get(idx).unwrap_or(&[0.0, 0.0, 0.0]);
            *pixel = image::Rgb([clamp_u8(values[0]), clamp_u8(values.get(1).copied().unwrap_or(0.0)), clamp_u8(values.get(2).copied().unwrap_or(0.0))]);
        }
        buf.save(self.output_dir.join(filename))?;
        Ok(())
    }

    fn write_mask_png(&self, mask: &Mask, filename: &str) -> Result<()> {
        let mut buf = image::GrayImage::new(mask.width(), mask.height());
        for (x, y, pixel) in buf.enumerate_pixels_mut() {
            let idx = Index::new(y as i32, x as i32);
            *pixel = image::Luma([if mask.is_valid(idx) { 255 } else { 0 }]);
        }
        buf.save(self.output_dir.join(filename))?;
        Ok(())
    }
}

fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[derive(Debug, Serialize)]
struct HistoryRegion {
    row: i32,
    col: i32,
    width: u32,
    height: u32,
}

impl From<Region> for HistoryRegion {
    fn from(r: Region) -> Self {
        Self { row: r.origin.row, col: r.origin.col, width: r.width, height: r.height }
    }
}

#[derive(Debug, Serialize)]
struct HistoryPair {
    source: HistoryRegion,
    target: HistoryRegion,
    score: f32,
    continuation: f32,
}

#[derive(Debug, Serialize)]
struct HistoryEntry {
    iteration: u32,
    targets_considered: usize,
    chosen: HistoryPair,
}

/// Dump the engine's history as a JSON array, one object per completed
/// iteration.
pub fn write_history(history: &[IterationRecord], path: &Path) -> Result<()> {
    let entries: Vec<HistoryEntry> = history
        .iter()
        .map(|record| HistoryEntry {
            iteration: record.iteration,
            targets_considered: record.candidate_patches.len(),
            chosen: HistoryPair {
                source: record.chosen.source.into(),
                target: record.chosen.target.into(),
                score: record.chosen.score,
                continuation: record.chosen.continuation,
            },
        })
        .collect();
    let json = serde_json::to_string_pretty(&entries)?;
    fs::write(path, json)?;
    Ok(())
}
