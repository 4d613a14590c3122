//! Pluggable acceptance visitors over `(target, source)` pairs.
//!
//! `VarianceDifference` is grounded directly on
//! `original_source/Visitors/AcceptanceVisitors/VarianceDifferenceAccpetanceVisitor.hpp`
//! (reject above a fixed per-channel variance delta). `AverageDifference`
//! is its sibling, built the same way over means instead of variances.

use crate::buffers::MultiChannelField;
use crate::geometry::{Offset, Region};
use crate::mask::Mask;

/// A predicate over `(target_region, source_region)` deciding whether a
/// candidate source is acceptable.
pub trait AcceptanceVisitor: Send + Sync {
    fn accept(&self, image: &MultiChannelField, mask: &Mask, target: Region, source: Region) -> bool;
}

fn target_support(mask: &Mask, target: Region) -> Vec<Offset> {
    mask.valid_pixels_in(target).into_iter().map(|idx| idx - target.origin).collect()
}

fn hole_support(mask: &Mask, target: Region) -> Vec<Offset> {
    mask.hole_offsets_in(target)
}

fn channel_mean(image: &MultiChannelField, origin: crate::geometry::Index, offsets: &[Offset]) -> Vec<f32> {
    let channels = image.channels;
    if offsets.is_empty() {
        return vec![0.0; channels];
    }
    let mut sums = vec![0.0f32; channels];
    for &off in offsets {
        if let Some(values) = image.get(origin + off) {
            for c in 0..channels {
                sums[c] += values[c];
            }
        }
    }
    let n = offsets.len() as f32;
    sums.iter().map(|s| s / n).collect()
}

fn channel_variance(image: &MultiChannelField, origin: crate::geometry::Index, offsets: &[Offset], mean: &[f32]) -> Vec<f32> {
    let channels = image.channels;
    if offsets.is_empty() {
        return vec![0.0; channels];
    }
    let mut sums = vec![0.0f32; channels];
    for &off in offsets {
        if let Some(values) = image.get(origin + off) {
            for c in 0..channels {
                let d = values[c] - mean[c];
                sums[c] += d * d;
            }
        }
    }
    let n = offsets.len() as f32;
    sums.iter().map(|s| s / n).collect()
}

fn mean_abs_diff(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum::<f32>() / a.len().max(1) as f32
}

/// Reject if the mean of the target's VALID pixels differs from the mean
/// of the source's hole-offset pixels by more than `threshold`.
pub struct AverageDifference {
    pub threshold: f32,
}

impl AcceptanceVisitor for AverageDifference {
    fn accept(&self, image: &MultiChannelField, mask: &Mask, target: Region, source: Region) -> bool {
        let target_mean = channel_mean(image, target.origin, &target_support(mask, target));
        let hole_offsets = hole_support(mask, target);
        let source_mean = channel_mean(image, source.origin, &hole_offsets);
        mean_abs_diff(&target_mean, &source_mean) <= self.threshold
    }
}

/// Reject if the per-channel variance of the target's VALID pixels
/// differs from the variance of the source's hole-offset pixels by more
/// than `threshold`.
pub struct VarianceDifference {
    pub threshold: f32,
}

impl AcceptanceVisitor for VarianceDifference {
    fn accept(&self, image: &MultiChannelField, mask: &Mask, target: Region, source: Region) -> bool {
        let target_offsets = target_support(mask, target);
        let target_mean = channel_mean(image, target.origin, &target_offsets);
        let target_var = channel_variance(image, target.origin, &target_offsets, &target_mean);

        let hole_offsets = hole_support(mask, target);
        let source_mean = channel_mean(image, source.origin, &hole_offsets);
        let source_var = channel_variance(image, source.origin, &hole_offsets, &source_mean);

        mean_abs_diff(&target_var, &source_var) <= self.threshold
    }
}

/// Conjunction of child visitors: accepts only if every child accepts.
pub struct Composite {
    pub children: Vec<Box<dyn AcceptanceVisitor>>,
}

impl AcceptanceVisitor for Composite {
    fn accept(&self, image: &MultiChannelField, mask: &Mask, target: Region, source: Region) -> bool {
        self.children.iter().all(|child| child.accept(image, mask, target, source))
    }
}
