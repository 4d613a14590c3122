//! Per-boundary-pixel confidence/data/priority and top-K target
//! extraction.
//!
//! Grounded on `original_source/Priority.h` / `PriorityFactory.h` for the
//! "priority is a pluggable strategy selected at construction" shape,
//! expressed here as a small enum (tagged variants + function values
//! rather than deep inheritance) instead of a runtime factory/registry.

use crate::buffers::{ScalarField, VectorField};
use crate::geometry::{Index, Region};
use crate::mask::Mask;

/// Data-term scale constant: `D(p) = |<iso,n>| / alpha`, `alpha = 255`.
pub const DATA_TERM_SCALE: f32 = 255.0;

/// Priority falls below this threshold: stop picking further top-K
/// targets early, but only once at least one target has already been
/// picked.
pub const PRIORITY_EPSILON: f32 = 1e-4;

/// How priority is derived from confidence and data. Only one variant
/// exists today; the enum exists so a second strategy can be added
/// without touching callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityStrategy {
    ConfidenceTimesData,
}

impl Default for PriorityStrategy {
    fn default() -> Self {
        PriorityStrategy::ConfidenceTimesData
    }
}

/// Debug/test seam: replaces the real boundary extraction and
/// confidence/data/priority computation outright, handing the engine a
/// fixed `(boundary pixels, priority field)` pair instead. This is the
/// only way to place priority mass at a pixel `extract_boundary` would
/// never produce, which is otherwise unreachable from outside the crate.
pub trait PriorityOverride: Send + Sync {
    fn evaluate(&self, mask: &Mask) -> (Vec<Index>, ScalarField);
}

pub struct PriorityEngine {
    strategy: PriorityStrategy,
}

impl PriorityEngine {
    pub fn new(strategy: PriorityStrategy) -> Self {
        Self { strategy }
    }

    /// `Confidence(p)` at every pixel in `boundary_pixels`: mean
    /// `ConfidenceMap` over the patch centred at `p`, intersected with
    /// VALID, cropped to the image.
    pub fn confidence_term(
        &self,
        confidence_map: &ScalarField,
        mask: &Mask,
        boundary_pixels: &[Index],
        patch_radius: u32,
    ) -> ScalarField {
        let mut out = ScalarField::filled(confidence_map.width(), confidence_map.height(), 0.0);
        for &p in boundary_pixels {
            let patch = Region::in_radius(p, patch_radius);
            let Some(cropped) = patch.crop(confidence_map.width(), confidence_map.height()) else {
                continue;
            };
            let area = (cropped.width * cropped.height) as f32;
            let sum: f32 = mask
                .valid_pixels_in(cropped)
                .iter()
                .map(|&q| *confidence_map.at(q))
                .sum();
            out.set(p, if area > 0.0 { sum / area } else { 0.0 });
        }
        out
    }

    /// `Data(p) = |<I(p), n(p))| / 255` at every boundary pixel.
    pub fn data_term(&self, isophotes: &VectorField, normals: &VectorField, boundary_pixels: &[Index]) -> ScalarField {
        let mut out = ScalarField::filled(isophotes.width(), isophotes.height(), 0.0);
        for &p in boundary_pixels {
            let iso = *isophotes.at(p);
            let n = *normals.at(p);
            let value = iso.dot(n).abs() / DATA_TERM_SCALE;
            out.set(p, value);
        }
        out
    }

    /// `Priority(p) = Confidence(p) * Data(p)` under the selected strategy.
    pub fn priority(&self, confidence: &ScalarField, data: &ScalarField, boundary_pixels: &[Index]) -> ScalarField {
        let mut out = ScalarField::filled(confidence.width(), confidence.height(), 0.0);
        for &p in boundary_pixels {
            let value = match self.strategy {
                PriorityStrategy::ConfidenceTimesData => confidence.at(p) * data.at(p),
            };
            out.set(p, value);
        }
        out
    }

    /// Repeatedly pick the boundary pixel with the highest priority, then
    /// suppress a `(2r+1)^2` square around it in a working copy so the
    /// next pick is geometrically separated. Stops early once the next
    /// maximum falls below `PRIORITY_EPSILON` (provided at least one pick
    /// has already been made), and never returns more than `k` targets.
    pub fn top_k_targets(
        &self,
        priority: &ScalarField,
        boundary_pixels: &[Index],
        k: usize,
        min_separation_radius: u32,
    ) -> Vec<Index> {
        let mut working = priority.clone();
        let mut candidates: Vec<Index> = boundary_pixels.to_vec();
        let mut result = Vec::new();

        while result.len() < k && !candidates.is_empty() {
            let (best_pos, &best_idx) = candidates
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| {
                    working.at(**a).partial_cmp(working.at(**b)).unwrap_or(std::cmp::Ordering::Equal)
                })
                .expect("candidates non-empty");
            let best_value = *working.at(best_idx);

            if !result.is_empty() && best_value < PRIORITY_EPSILON {
                break;
            }

            result.push(best_idx);
            candidates.swap_remove(best_pos);

            let suppress = Region::in_radius(best_idx, min_separation_radius);
            working.fill(suppress, 0.0);
        }

        result
    }
}
