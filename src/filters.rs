//! Small Gaussian-blur and gradient helpers used internally by `boundary`
//! and `isophote`.
//!
//! These are inpainting-specific, not a general-purpose pure image-filter
//! library: the masked variant renormalises by which taps land on VALID
//! pixels, which only makes sense with a `Mask` in hand. Grounded on
//! `preprocessor::bilateral_filter`'s explicit windowed-convolution style
//! (no image-processing crate, hand-written nested loops over a kernel
//! radius).

use crate::buffers::{MultiChannelField, ScalarField};
use crate::geometry::{Index, Vec2};
use crate::mask::Mask;

/// Gaussian kernel radius covering ~99% of the mass, the same `3*sigma`
/// rule the bilateral filter uses.
fn kernel_radius(sigma: f32) -> i32 {
    (3.0 * sigma).ceil() as i32
}

fn gaussian_weight(dr: i32, dc: i32, sigma: f32) -> f32 {
    let sigma_sq2 = 2.0 * sigma * sigma;
    (-((dr * dr + dc * dc) as f32) / sigma_sq2).exp()
}

/// Plain (unmasked) Gaussian blur of a scalar field. Used for
/// `G_sigma * Mask` in normal-field computation, where the indicator's
/// zero-valued HOLE pixels are meant to pull the blurred value down near
/// the boundary — that's the whole mechanism that gives the normal its
/// direction.
pub fn gaussian_blur_scalar(field: &ScalarField, sigma: f32) -> ScalarField {
    let radius = kernel_radius(sigma);
    let width = field.width() as i32;
    let height = field.height() as i32;
    let mut out = ScalarField::filled(field.width(), field.height(), 0.0);

    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0f32;
            let mut weight_sum = 0.0f32;
            for dy in -radius..=radius {
                let sy = y + dy;
                if sy < 0 || sy >= height {
                    continue;
                }
                for dx in -radius..=radius {
                    let sx = x + dx;
                    if sx < 0 || sx >= width {
                        continue;
                    }
                    let w = gaussian_weight(dy, dx, sigma);
                    sum += w * field.at(Index::new(sy, sx));
                    weight_sum += w;
                }
            }
            let value = if weight_sum > 0.0 { sum / weight_sum } else { 0.0 };
            out.set(Index::new(y, x), value);
        }
    }
    out
}

/// Masked Gaussian blur of a multi-channel field: at each pixel, the
/// kernel is renormalised by the sum of weights whose taps fall on VALID
/// pixels; if no taps are valid the result is 0.
pub fn masked_gaussian_blur(field: &MultiChannelField, mask: &Mask, sigma: f32) -> MultiChannelField {
    let radius = kernel_radius(sigma);
    let width = field.width() as i32;
    let height = field.height() as i32;
    let channels = field.channels;
    let mut out = MultiChannelField::filled(field.width(), field.height(), channels, 0.0);

    for y in 0..height {
        for x in 0..width {
            let mut sums = vec![0.0f32; channels];
            let mut weight_sum = 0.0f32;
            for dy in -radius..=radius {
                let sy = y + dy;
                if sy < 0 || sy >= height {
                    continue;
                }
                for dx in -radius..=radius {
                    let sx = x + dx;
                    if sx < 0 || sx >= width {
                        continue;
                    }
                    let idx = Index::new(sy, sx);
                    if !mask.is_valid(idx) {
                        continue;
                    }
                    let w = gaussian_weight(dy, dx, sigma);
                    if let Some(values) = field.get(idx) {
                        for c in 0..channels {
                            sums[c] += w * values[c];
                        }
                    }
                    weight_sum += w;
                }
            }
            let values: Vec<f32> = if weight_sum > 0.0 {
                sums.iter().map(|s| s / weight_sum).collect()
            } else {
                vec![0.0; channels]
            };
            out.set(Index::new(y, x), &values);
        }
    }
    out
}

/// Central-difference gradient of a scalar field. `Vec2.x` is the
/// d/dcol component, `Vec2.y` the d/drow component (image convention).
/// Border pixels use a one-sided difference.
pub fn gradient_scalar(field: &ScalarField) -> crate::buffers::VectorField {
    let width = field.width() as i32;
    let height = field.height() as i32;
    let mut out = crate::buffers::VectorField::filled(field.width(), field.height(), Vec2::ZERO);

    for y in 0..height {
        for x in 0..width {
            let left = if x > 0 { *field.at(Index::new(y, x - 1)) } else { *field.at(Index::new(y, x)) };
            let right = if x < width - 1 { *field.at(Index::new(y, x + 1)) } else { *field.at(Index::new(y, x)) };
            let up = if y > 0 { *field.at(Index::new(y - 1, x)) } else { *field.at(Index::new(y, x)) };
            let down = if y < height - 1 { *field.at(Index::new(y + 1, x)) } else { *field.at(Index::new(y, x)) };
            let dx = (right - left) / 2.0;
            let dy = (down - up) / 2.0;
            out.set(Index::new(y, x), Vec2::new(dx, dy));
        }
    }
    out
}
