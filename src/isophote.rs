//! Isophote field: luminance -> masked blur -> masked gradient -> rotate
//! 90 degrees.
//!
//! Luminance weights grounded directly on `edge_detector::detect_edges_sobel`
//! (`0.299/0.587/0.114`, the same ITU-R BT.601 weights). The masked blur is
//! `filters::masked_gaussian_blur`.

use crate::buffers::{MultiChannelField, ScalarField, VectorField};
use crate::filters::{gradient_scalar, masked_gaussian_blur};
use crate::geometry::{Index, Vec2};
use crate::mask::Mask;

/// Gaussian variance for the luminance blur feeding the isophote
/// gradient. Shares the normals blur's `G_sigma` notation and variance;
/// no distinct value is specified for this blur, so it is pinned here
/// rather than silently guessed elsewhere.
pub const ISOPHOTE_GAUSSIAN_VARIANCE: f32 = 2.0;

/// ITU-R BT.601 luminance of a (at least 3-channel) `MultiChannelField`.
/// Single-channel fields are treated as already being luminance.
pub fn luminance(image: &MultiChannelField) -> ScalarField {
    let mut out = ScalarField::filled(image.width(), image.height(), 0.0);
    for row in 0..image.height() as i32 {
        for col in 0..image.width() as i32 {
            let idx = Index::new(row, col);
            let channels = image.get(idx).expect("in-bounds index");
            let l = if channels.len() >= 3 {
                0.299 * channels[0] + 0.587 * channels[1] + 0.114 * channels[2]
            } else {
                channels[0]
            };
            out.set(idx, l);
        }
    }
    out
}

/// `I(p) = Rot90(grad(G_sigma * L))`, defined (non-zero) only at VALID
/// pixels; HOLE/IGNORED pixels carry `Vec2::ZERO`.
pub fn compute_isophotes(image: &MultiChannelField, mask: &Mask) -> VectorField {
    let lum = luminance(image);
    let lum_field = MultiChannelField::filled(image.width(), image.height(), 1, 0.0);
    let mut lum_field = lum_field;
    for row in 0..image.height() as i32 {
        for col in 0..image.width() as i32 {
            let idx = Index::new(row, col);
            lum_field.set(idx, &[*lum.at(idx)]);
        }
    }

    let blurred = masked_gaussian_blur(&lum_field, mask, ISOPHOTE_GAUSSIAN_VARIANCE.sqrt());
    let mut blurred_scalar = ScalarField::filled(image.width(), image.height(), 0.0);
    for row in 0..image.height() as i32 {
        for col in 0..image.width() as i32 {
            let idx = Index::new(row, col);
            blurred_scalar.set(idx, blurred.get(idx).unwrap()[0]);
        }
    }

    let gradient = gradient_scalar(&blurred_scalar);

    let mut out = VectorField::filled(image.width(), image.height(), Vec2::ZERO);
    for row in 0..image.height() as i32 {
        for col in 0..image.width() as i32 {
            let idx = Index::new(row, col);
            if mask.is_valid(idx) {
                out.set(idx, gradient.at(idx).rot90());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    include!("isophote_tests.rs");
}
