use super::*;
use crate::buffers::Grid;
use crate::mask::{BYTE_HOLE, PixelStatus};

#[test]
fn seed_finds_all_fully_valid_patches() {
    let mask = Mask::filled(9, 9, PixelStatus::Valid);
    let mut index = SourcePatchIndex::new(1);
    index.seed(&mask);
    // Every centre with a full 3x3 extent inside a 9x9 all-valid image:
    // (9-2) x (9-2) = 49.
    assert_eq!(index.len(), 49);
    assert!(index.all_valid(&mask));
}

#[test]
fn seed_excludes_patches_touching_hole() {
    let mut bytes = Grid::filled(9, 9, crate::mask::BYTE_VALID);
    bytes.set(Index::new(4, 4), BYTE_HOLE);
    let mask = Mask::from_bytes(&bytes);
    let mut index = SourcePatchIndex::new(1);
    index.seed(&mask);
    for region in index.regions() {
        assert!(mask.is_valid_region(*region));
        assert!(!(region.origin.row <= 4
            && 4 < region.end_row_exclusive()
            && region.origin.col <= 4
            && 4 < region.end_col_exclusive()));
    }
}

#[test]
fn empty_mask_yields_no_source_patches_when_too_small() {
    let mask = Mask::filled(2, 2, PixelStatus::Valid);
    let mut index = SourcePatchIndex::new(1);
    index.seed(&mask);
    assert!(index.is_empty());
}

#[test]
fn rescan_adds_only_newly_valid_patches() {
    let mut bytes = Grid::filled(7, 7, crate::mask::BYTE_VALID);
    bytes.set(Index::new(3, 3), BYTE_HOLE);
    let mut mask = Mask::from_bytes(&bytes);
    let mut index = SourcePatchIndex::new(1);
    index.seed(&mask);
    let before = index.len();

    mask.set_valid(Index::new(3, 3));
    let added = index.scan(&mask, Region::in_radius(Index::new(3, 3), 1).grow_by(1));
    assert!(added > 0);
    assert_eq!(index.len(), before + added);
    assert!(index.all_valid(&mask));
}

#[test]
fn scan_is_idempotent_for_already_indexed_centers() {
    let mask = Mask::filled(5, 5, PixelStatus::Valid);
    let mut index = SourcePatchIndex::new(1);
    let first = index.seed(&mask);
    let second = index.scan(&mask, Region::new(Index::new(0, 0), 5, 5));
    assert!(first > 0);
    assert_eq!(second, 0);
}
