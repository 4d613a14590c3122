//! Candidate source-patch ranking.
//!
//! The default squared-L2 and luminance-only difference functions are
//! grounded on `enhanced_quantizer::perceptual_dist_sq` (a small, pure,
//! weighted-channel squared-distance function). The gradient-magnitude-
//! histogram variant is grounded on
//! `original_source/DifferenceFunctions/Patch/Tests/TestGMHDifference.cpp`,
//! whose test shows its shape: bin gradient magnitude into a histogram
//! and compare histograms.
//!
//! Per-source scoring is dispatched with `rayon` and joined before the
//! caller continues — an embarrassingly parallel reduction over
//! independent source patches.

use rayon::prelude::*;

use crate::buffers::MultiChannelField;
use crate::geometry::{angle_between, next_pixel_along, Index, Offset, Region, Vec2};
use crate::mask::Mask;
use crate::source_index::SourcePatchIndex;

/// A pluggable patch-difference function. Contract: symmetric,
/// non-negative, zero iff the regions are pointwise equal on the
/// measured support.
pub trait DifferenceFn: Send + Sync {
    fn distance(&self, image: &MultiChannelField, mask: &Mask, source: Region, target: Region) -> f32;
}

/// Offsets within `target` where the target pixel is VALID — the support
/// over which every difference function below is measured (computed
/// only where the target pixel is already known).
fn measured_support(mask: &Mask, target: Region) -> Vec<Offset> {
    mask.valid_pixels_in(target).into_iter().map(|idx| idx - target.origin).collect()
}

fn channel_sq_diff(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Default: mean squared L2 distance over all channels, over the support.
pub struct SquaredL2Difference;

impl DifferenceFn for SquaredL2Difference {
    fn distance(&self, image: &MultiChannelField, mask: &Mask, source: Region, target: Region) -> f32 {
        let support = measured_support(mask, target);
        if support.is_empty() {
            return 0.0;
        }
        let sum: f32 = support
            .iter()
            .map(|&off| {
                let s = image.get(source.origin + off).unwrap_or(&[]);
                let t = image.get(target.origin + off).unwrap_or(&[]);
                channel_sq_diff(s, t)
            })
            .sum();
        sum / support.len() as f32
    }
}

/// Luminance-only variant: squared difference of ITU-R BT.601 luminance.
pub struct LuminanceDifference;

fn luminance_of(channels: &[f32]) -> f32 {
    if channels.len() >= 3 {
        0.299 * channels[0] + 0.587 * channels[1] + 0.114 * channels[2]
    } else {
        channels.first().copied().unwrap_or(0.0)
    }
}

impl DifferenceFn for LuminanceDifference {
    fn distance(&self, image: &MultiChannelField, mask: &Mask, source: Region, target: Region) -> f32 {
        let support = measured_support(mask, target);
        if support.is_empty() {
            return 0.0;
        }
        let sum: f32 = support
            .iter()
            .map(|&off| {
                let s = luminance_of(image.get(source.origin + off).unwrap_or(&[]));
                let t = luminance_of(image.get(target.origin + off).unwrap_or(&[]));
                (s - t) * (s - t)
            })
            .sum();
        sum / support.len() as f32
    }
}

const GMH_BINS: usize = 16;
const GMH_MAX_MAGNITUDE: f32 = 360.0; // sqrt(2) * 255 rounded up, comfortably covers 3-channel gradients

/// Local gradient magnitude at `idx` within `image`, via one-sided
/// differences against the previous row/column (keeps the support
/// strictly inside `region`, no out-of-region reads).
fn local_gradient_magnitude(image: &MultiChannelField, idx: Index, region: Region) -> f32 {
    let here = luminance_of(image.get(idx).unwrap_or(&[]));
    let left_idx = Index::new(idx.row, idx.col - 1);
    let up_idx = Index::new(idx.row - 1, idx.col);
    let gx = if left_idx.col >= region.origin.col {
        here - luminance_of(image.get(left_idx).unwrap_or(&[here]))
    } else {
        0.0
    };
    let gy = if up_idx.row >= region.origin.row {
        here - luminance_of(image.get(up_idx).unwrap_or(&[here]))
    } else {
        0.0
    };
    (gx * gx + gy * gy).sqrt()
}

fn gradient_magnitude_histogram(image: &MultiChannelField, region: Region, support: &[Offset]) -> [f32; GMH_BINS] {
    let mut hist = [0.0f32; GMH_BINS];
    for &off in support {
        let idx = region.origin + off;
        let mag = local_gradient_magnitude(image, idx, region).min(GMH_MAX_MAGNITUDE);
        let bin = ((mag / GMH_MAX_MAGNITUDE) * (GMH_BINS as f32 - 1.0)) as usize;
        hist[bin.min(GMH_BINS - 1)] += 1.0;
    }
    let total: f32 = hist.iter().sum();
    if total > 0.0 {
        for v in hist.iter_mut() {
            *v /= total;
        }
    }
    hist
}

/// Gradient-magnitude-histogram difference: compares normalised gradient-
/// magnitude histograms of source and target over the support, via mean
/// squared bin difference.
pub struct GradientMagnitudeHistogramDifference;

impl DifferenceFn for GradientMagnitudeHistogramDifference {
    fn distance(&self, image: &MultiChannelField, mask: &Mask, source: Region, target: Region) -> f32 {
        let support = measured_support(mask, target);
        if support.is_empty() {
            return 0.0;
        }
        let source_support: Vec<Offset> = support.clone();
        let hist_s = gradient_magnitude_histogram(image, source, &source_support);
        let hist_t = gradient_magnitude_histogram(image, target, &support);
        hist_s.iter().zip(hist_t.iter()).map(|(a, b)| (a - b) * (a - b)).sum::<f32>() / GMH_BINS as f32
    }
}

const HSV_BINS: usize = 12;

fn rgb_to_hue(channels: &[f32]) -> f32 {
    if channels.len() < 3 {
        return 0.0;
    }
    let (r, g, b) = (channels[0] / 255.0, channels[1] / 255.0, channels[2] / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    if delta < 1e-6 {
        return 0.0;
    }
    let hue = if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * (((b - r) / delta) + 2.0)
    } else {
        60.0 * (((r - g) / delta) + 4.0)
    };
    hue.rem_euclid(360.0)
}

fn hsv_histogram(image: &MultiChannelField, region: Region, support: &[Offset]) -> [f32; HSV_BINS] {
    let mut hist = [0.0f32; HSV_BINS];
    for &off in support {
        let idx = region.origin + off;
        let hue = rgb_to_hue(image.get(idx).unwrap_or(&[]));
        let bin = ((hue / 360.0) * HSV_BINS as f32) as usize;
        hist[bin.min(HSV_BINS - 1)] += 1.0;
    }
    let total: f32 = hist.iter().sum();
    if total > 0.0 {
        for v in hist.iter_mut() {
            *v /= total;
        }
    }
    hist
}

/// HSV (hue) histogram difference: a named but otherwise unspecified
/// variant, built here in full rather than left as a placeholder.
pub struct HsvHistogramDifference;

impl DifferenceFn for HsvHistogramDifference {
    fn distance(&self, image: &MultiChannelField, mask: &Mask, source: Region, target: Region) -> f32 {
        let support = measured_support(mask, target);
        if support.is_empty() {
            return 0.0;
        }
        let hist_s = hsv_histogram(image, source, &support);
        let hist_t = hsv_histogram(image, target, &support);
        hist_s.iter().zip(hist_t.iter()).map(|(a, b)| (a - b) * (a - b)).sum::<f32>() / HSV_BINS as f32
    }
}

/// One ranked candidate: a source region, its primary score (lower is
/// better), and an optional continuation-score tiebreaker — computed
/// only within the top-K, never the primary ranking metric.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub source: Region,
    pub score: f32,
    pub continuation: Option<f32>,
}

/// Rank every source patch in `index` against `target` by `diff_fn`,
/// dispatched to a worker pool, and return the `top_n` best (ascending
/// by score).
pub fn rank_sources(
    image: &MultiChannelField,
    mask: &Mask,
    target: Region,
    index: &SourcePatchIndex,
    diff_fn: &dyn DifferenceFn,
    top_n: usize,
) -> Vec<Candidate> {
    let mut scored: Vec<Candidate> = index
        .regions()
        .par_iter()
        .map(|&source| Candidate {
            source,
            score: diff_fn.distance(image, mask, source, target),
            continuation: None,
        })
        .collect();

    scored.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_n);
    scored
}

fn pixel_diff(a: &[f32], b: &[f32]) -> f32 {
    channel_sq_diff(a, b).sqrt()
}

fn max_pixel_diff(channels: usize) -> f32 {
    (channels as f32).sqrt() * 255.0
}

/// Continuation-difference tiebreaker: for each boundary pixel `b`
/// inside `target` on the valid side, step one pixel along
/// `isophotes(b)` into the hole side, map by the constant
/// `source.origin - target.origin` offset to obtain a candidate source
/// pixel, and average the normalised pixel-value and isophote-angle
/// mismatch between `b` and that candidate. Lower is better, in `[0, 1]`.
pub fn continuation_score(
    image: &MultiChannelField,
    isophotes: &crate::buffers::VectorField,
    mask: &Mask,
    target: Region,
    source: Region,
) -> f32 {
    let offset_to_source = source.origin - target.origin;
    let boundary_in_target: Vec<Index> = mask
        .valid_pixels_in(target)
        .into_iter()
        .filter(|&b| crate::geometry::NEIGHBOR_OFFSETS_8.iter().any(|&o| mask.is_hole(b + o)))
        .collect();

    if boundary_in_target.is_empty() {
        return 0.0;
    }

    let max_diff = max_pixel_diff(image.channels);
    let mut total = 0.0f32;
    let mut count = 0usize;

    for b in boundary_in_target {
        let iso_b = *isophotes.at(b);
        if iso_b == Vec2::ZERO {
            continue;
        }
        let stepped = next_pixel_along(b, iso_b);
        let candidate = stepped + offset_to_source;
        let (Some(b_pixel), Some(cand_pixel)) = (image.get(b), image.get(candidate)) else {
            continue;
        };
        let value_term = pixel_diff(b_pixel, cand_pixel) / max_diff;
        let iso_cand = isophotes.get(candidate).copied().unwrap_or(Vec2::ZERO);
        let angle_term = angle_between(iso_b, iso_cand) / std::f32::consts::PI;
        total += 0.5 * (value_term + angle_term);
        count += 1;
    }

    if count == 0 {
        0.0
    } else {
        total / count as f32
    }
}

#[cfg(test)]
mod tests {
    include!("search_tests.rs");
}
