//! Outer-boundary extraction and smoothed inward-normal estimation.
//!
//! Grounded on `region_extractor::follow_boundary` / Moore-neighbourhood
//! boundary tracing for the adjacency-test half (8-connectivity against a
//! binary bitmap), and `preprocessor::bilateral_filter` for the
//! Gaussian-blur half.

use crate::buffers::{ByteField, ScalarField, VectorField};
use crate::filters::{gaussian_blur_scalar, gradient_scalar};
use crate::geometry::{Index, Vec2, NEIGHBOR_OFFSETS_8};
use crate::mask::Mask;

/// Gaussian variance used to smooth the mask before differentiating it
/// for normals.
pub const NORMALS_GAUSSIAN_VARIANCE: f32 = 2.0;

/// `BoundaryMask`: 1 iff the pixel is VALID and 4- or 8-adjacent to a HOLE
/// pixel. Recomputed from scratch every step.
pub fn extract_boundary(mask: &Mask) -> ByteField {
    let mut out = ByteField::filled(mask.width(), mask.height(), 0);
    for row in 0..mask.height() as i32 {
        for col in 0..mask.width() as i32 {
            let idx = Index::new(row, col);
            if !mask.is_valid(idx) {
                continue;
            }
            let on_boundary = NEIGHBOR_OFFSETS_8.iter().any(|&off| mask.is_hole(idx + off));
            if on_boundary {
                out.set(idx, 1);
            }
        }
    }
    out
}

/// Every boundary pixel, in row-major order.
pub fn boundary_pixels(boundary: &ByteField) -> Vec<Index> {
    let mut out = Vec::new();
    for row in 0..boundary.height() as i32 {
        for col in 0..boundary.width() as i32 {
            let idx = Index::new(row, col);
            if *boundary.at(idx) != 0 {
                out.push(idx);
            }
        }
    }
    out
}

/// `BoundaryNormals`: unit-norm inward normal at every boundary pixel,
/// computed as `normalize(grad(G_sigma * Mask))` restricted to `boundary`.
/// Undefined (left as `Vec2::ZERO`) wherever the blurred-mask gradient is
/// (numerically) zero.
pub fn compute_normals(mask: &Mask, boundary: &ByteField) -> VectorField {
    let scalar_mask = mask_to_scalar_field(mask);
    let sigma = NORMALS_GAUSSIAN_VARIANCE.sqrt();
    let blurred = gaussian_blur_scalar(&scalar_mask, sigma);
    let gradient = gradient_scalar(&blurred);

    let mut out = VectorField::filled(mask.width(), mask.height(), Vec2::ZERO);
    for idx in boundary_pixels(boundary) {
        let g = *gradient.at(idx);
        if let Some(n) = g.normalized() {
            out.set(idx, n);
        }
    }
    out
}

/// HOLE -> 0.0, VALID -> 255.0, IGNORED -> 0.0 (never read: IGNORED pixels
/// are outside the working domain and never become boundary pixels).
fn mask_to_scalar_field(mask: &Mask) -> ScalarField {
    let mut out = ScalarField::filled(mask.width(), mask.height(), 0.0);
    for row in 0..mask.height() as i32 {
        for col in 0..mask.width() as i32 {
            let idx = Index::new(row, col);
            if mask.is_valid(idx) {
                out.set(idx, 255.0);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    include!("boundary_tests.rs");
}
