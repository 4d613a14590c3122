use inpaint::acceptance::VarianceDifference;
use inpaint::buffers::{Grid, MultiChannelField, ScalarField};
use inpaint::engine::{CoreError, StepOutcome};
use inpaint::geometry::{Index, NEIGHBOR_OFFSETS_8};
use inpaint::mask::{Mask, BYTE_HOLE, BYTE_VALID};
use inpaint::priority::PriorityOverride;
use inpaint::Engine;

fn byte_mask(width: u32, height: u32, holes: &[(i32, i32)]) -> Mask {
    let mut bytes = Grid::filled(width, height, BYTE_VALID);
    for &(row, col) in holes {
        bytes.set(Index::new(row, col), BYTE_HOLE);
    }
    Mask::from_bytes(&bytes)
}

fn stripe_image(size: u32) -> MultiChannelField {
    let mut image = MultiChannelField::filled(size, size, 3, 0.0);
    for row in 0..size as i32 {
        for col in 0..size as i32 {
            let v = if col % 2 == 0 { 0.0 } else { 255.0 };
            image.set(Index::new(row, col), &[v, v, v]);
        }
    }
    image
}

#[test]
fn scenario_1_empty_mask_finishes_in_zero_iterations_unchanged() {
    let image = MultiChannelField::filled(4, 4, 3, 128.0);
    let mask = byte_mask(4, 4, &[]);
    let mut engine = Engine::new(image.clone(), mask, 1).unwrap();

    assert!(matches!(engine.step().unwrap(), StepOutcome::Finished));
    assert_eq!(engine.iteration(), 0);
    for row in 0..4 {
        for col in 0..4 {
            let idx = Index::new(row, col);
            assert_eq!(engine.image().get(idx), image.get(idx));
        }
    }
}

#[test]
fn scenario_2_single_pixel_hole_fills_in_one_iteration() {
    let image = MultiChannelField::filled(5, 5, 3, 255.0);
    let mask = byte_mask(5, 5, &[(2, 2)]);
    let mut engine = Engine::new(image, mask, 1).unwrap();

    engine.run_to_completion().unwrap();
    assert_eq!(engine.iteration(), 1);
    assert_eq!(engine.mask().hole_count(), 0);
    assert_eq!(engine.image().get(Index::new(2, 2)), Some([255.0, 255.0, 255.0].as_slice()));
}

#[test]
fn scenario_3_stripe_hole_reconstructs_the_stripe_pattern() {
    let size = 16;
    let image = stripe_image(size);
    let holes: Vec<(i32, i32)> = (0..size as i32).flat_map(|row| [(row, 7), (row, 8)]).collect();
    let mask = byte_mask(size, size, &holes);
    let mut engine = Engine::new(image, mask, 2).unwrap();

    engine.run_to_completion().unwrap();
    assert_eq!(engine.mask().hole_count(), 0);
    for row in 0..size as i32 {
        assert_eq!(engine.image().get(Index::new(row, 7)), Some([255.0, 255.0, 255.0].as_slice()));
        assert_eq!(engine.image().get(Index::new(row, 8)), Some([0.0, 0.0, 0.0].as_slice()));
    }
}

#[test]
fn scenario_4_two_target_forward_look_fills_both_holes() {
    let mut image = MultiChannelField::filled(32, 32, 3, 0.0);
    for row in 0..32 {
        for col in 0..32 {
            let v = ((row + col) % 2) as f32 * 255.0;
            image.set(Index::new(row, col), &[v, v, v]);
        }
    }
    let mut holes = Vec::new();
    for row in 2..5 {
        for col in 2..5 {
            holes.push((row, col));
        }
    }
    for row in 20..23 {
        for col in 20..23 {
            holes.push((row, col));
        }
    }
    let mask = byte_mask(32, 32, &holes);
    let mut engine = Engine::new(image, mask, 2).unwrap();
    engine.set_max_forward_look(2);

    engine.run_to_completion().unwrap();
    assert_eq!(engine.mask().hole_count(), 0);
}

#[test]
fn scenario_5_variance_acceptance_visitor_with_zero_threshold_agrees_with_default_on_constant_image() {
    let image = MultiChannelField::filled(9, 9, 3, 100.0);
    let mask = byte_mask(9, 9, &[(4, 4)]);

    let mut baseline = Engine::new(image.clone(), mask.clone(), 1).unwrap();
    baseline.run_to_completion().unwrap();

    let mut visited = Engine::new(image, mask, 1).unwrap();
    visited.set_acceptance(Box::new(VarianceDifference { threshold: 0.0 }));
    visited.run_to_completion().unwrap();

    assert_eq!(baseline.mask().hole_count(), 0);
    assert_eq!(visited.mask().hole_count(), 0);
    assert_eq!(baseline.image().get(Index::new(4, 4)), visited.image().get(Index::new(4, 4)));
}

struct StubPriorityAt(Index);

impl PriorityOverride for StubPriorityAt {
    fn evaluate(&self, mask: &Mask) -> (Vec<Index>, ScalarField) {
        let mut priority = ScalarField::filled(mask.width(), mask.height(), 0.0);
        priority.set(self.0, 1.0);
        (vec![self.0], priority)
    }
}

#[test]
fn scenario_6_stub_priority_at_an_isolated_pixel_surfaces_as_priority_desync() {
    // extract_boundary only ever reports VALID pixels 8-adjacent to a
    // HOLE, so a stub priority source is the only way to hand the engine
    // a target without that property and drive the desync check for real.
    let mask = byte_mask(5, 5, &[(2, 2)]);
    let isolated = Index::new(0, 0);
    assert!(!NEIGHBOR_OFFSETS_8.iter().any(|&o| mask.is_hole(isolated + o)));

    let image = MultiChannelField::filled(5, 5, 3, 10.0);
    let mut engine = Engine::new(image, mask, 1).unwrap();
    engine.set_priority_override(Some(Box::new(StubPriorityAt(isolated))));

    let err = engine.step().unwrap_err();
    match err {
        CoreError::PriorityDesync { pixel } => assert_eq!(pixel, isolated),
        other => panic!("expected PriorityDesync, got {other:?}"),
    }
}

#[test]
fn patch_radius_zero_reduces_to_pixel_by_pixel_copy() {
    let image = MultiChannelField::filled(6, 6, 3, 200.0);
    let mask = byte_mask(6, 6, &[(3, 3), (3, 4)]);
    let mut engine = Engine::new(image, mask, 0).unwrap();

    engine.run_to_completion().unwrap();
    assert_eq!(engine.mask().hole_count(), 0);
    assert!(engine.iteration() as usize <= 2);
}

#[test]
fn hole_touching_image_border_is_filled_using_cropped_patches() {
    let image = MultiChannelField::filled(6, 6, 3, 50.0);
    let mask = byte_mask(6, 6, &[(0, 0)]);
    let mut engine = Engine::new(image, mask, 1).unwrap();

    engine.run_to_completion().unwrap();
    assert_eq!(engine.mask().hole_count(), 0);
}

#[test]
fn all_valid_mask_finishes_in_zero_steps_with_bitwise_unchanged_image() {
    let image = MultiChannelField::filled(8, 8, 3, 77.0);
    let mask = byte_mask(8, 8, &[]);
    let mut engine = Engine::new(image.clone(), mask, 2).unwrap();

    engine.run_to_completion().unwrap();
    assert_eq!(engine.iteration(), 0);
    for row in 0..8 {
        for col in 0..8 {
            let idx = Index::new(row, col);
            assert_eq!(engine.image().get(idx), image.get(idx));
        }
    }
}

#[test]
fn completes_within_hole_count_iterations_with_patch_radius_zero() {
    let holes: Vec<(i32, i32)> = vec![(5, 5), (5, 6), (6, 5), (6, 6)];
    let hole_count = holes.len() as u32;
    let image = MultiChannelField::filled(10, 10, 3, 30.0);
    let mask = byte_mask(10, 10, &holes);
    let mut engine = Engine::new(image, mask, 0).unwrap();

    engine.run_to_completion().unwrap();
    assert_eq!(engine.mask().hole_count(), 0);
    assert!(engine.iteration() <= hole_count);
}

#[test]
fn no_source_patches_is_rejected_when_every_pixel_is_a_hole() {
    let holes: Vec<(i32, i32)> = (0..3).flat_map(|row| (0..3).map(move |col| (row, col))).collect();
    let image = MultiChannelField::filled(3, 3, 3, 0.0);
    let mask = byte_mask(3, 3, &holes);

    let err = Engine::new(image, mask, 0).unwrap_err();
    assert!(matches!(err, CoreError::NoSourcePatches { patch_radius: 0 }));
}
