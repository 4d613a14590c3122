use super::*;
use crate::buffers::Grid;
use crate::geometry::Index;
use crate::mask::{BYTE_HOLE, BYTE_VALID, PixelStatus};

fn uniform_image_with_hole(value: f32, hole_value: f32) -> (MultiChannelField, Mask) {
    let mut image = MultiChannelField::filled(9, 9, 3, value);
    let mut bytes = Grid::filled(9, 9, BYTE_VALID);
    for off in [(4, 4)] {
        bytes.set(Index::new(off.0, off.1), BYTE_HOLE);
        image.set(Index::new(off.0, off.1), &[hole_value; 3]);
    }
    (image, Mask::from_bytes(&bytes))
}

#[test]
fn average_difference_accepts_matching_patches() {
    let (image, mask) = uniform_image_with_hole(100.0, 0.0);
    let target = Region::in_radius(Index::new(4, 4), 1);
    let source = Region::in_radius(Index::new(2, 2), 1);
    let visitor = AverageDifference { threshold: 5.0 };
    assert!(visitor.accept(&image, &mask, target, source));
}

#[test]
fn average_difference_rejects_mismatched_patches() {
    let mut image = MultiChannelField::filled(9, 9, 3, 0.0);
    for row in 0..9 {
        for col in 0..9 {
            image.set(Index::new(row, col), &[(row * 9 + col) as f32; 3]);
        }
    }
    let mut bytes = Grid::filled(9, 9, BYTE_VALID);
    bytes.set(Index::new(4, 4), BYTE_HOLE);
    let mask = Mask::from_bytes(&bytes);
    let target = Region::in_radius(Index::new(4, 4), 1);
    let source = Region::in_radius(Index::new(0, 0), 1);
    let visitor = AverageDifference { threshold: 1.0 };
    assert!(!visitor.accept(&image, &mask, target, source));
}

#[test]
fn variance_difference_zero_threshold_accepts_constant_image() {
    let (image, mask) = uniform_image_with_hole(128.0, 128.0);
    let target = Region::in_radius(Index::new(4, 4), 1);
    let source = Region::in_radius(Index::new(2, 2), 1);
    let visitor = VarianceDifference { threshold: 0.0 };
    assert!(visitor.accept(&image, &mask, target, source));
}

#[test]
fn composite_requires_all_children_to_accept() {
    let (image, mask) = uniform_image_with_hole(100.0, 0.0);
    let target = Region::in_radius(Index::new(4, 4), 1);
    let source = Region::in_radius(Index::new(2, 2), 1);

    let always_reject = VarianceDifference { threshold: -1.0 };
    assert!(!always_reject.accept(&image, &mask, target, source));

    let composite = Composite {
        children: vec![
            Box::new(AverageDifference { threshold: 1000.0 }),
            Box::new(VarianceDifference { threshold: -1.0 }),
        ],
    };
    assert!(!composite.accept(&image, &mask, target, source));
}

#[test]
fn composite_of_permissive_children_accepts() {
    let (image, mask) = uniform_image_with_hole(100.0, 0.0);
    let target = Region::in_radius(Index::new(4, 4), 1);
    let source = Region::in_radius(Index::new(2, 2), 1);
    let composite = Composite {
        children: vec![
            Box::new(AverageDifference { threshold: 1000.0 }),
            Box::new(VarianceDifference { threshold: 1000.0 }),
        ],
    };
    assert!(composite.accept(&image, &mask, target, source));
    let _ = PixelStatus::Valid;
}
