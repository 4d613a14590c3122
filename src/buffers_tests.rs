use super::*;
use crate::geometry::{Index, Offset, Region};

#[test]
fn grid_filled_has_requested_shape() {
    let g = Grid::filled(4, 3, 0.0f32);
    assert_eq!(g.width(), 4);
    assert_eq!(g.height(), 3);
}

#[test]
fn get_set_round_trip() {
    let mut g = Grid::filled(4, 4, 0u8);
    g.set(Index::new(2, 3), 42);
    assert_eq!(*g.get(Index::new(2, 3)).unwrap(), 42);
}

#[test]
fn get_out_of_bounds_is_none() {
    let g = Grid::filled(4, 4, 0u8);
    assert!(g.get(Index::new(-1, 0)).is_none());
    assert!(g.get(Index::new(0, 10)).is_none());
}

#[test]
fn fill_clips_to_bounds() {
    let mut g = Grid::filled(4, 4, 0u8);
    let region = Region::new(Index::new(-2, -2), 4, 4);
    g.fill(region, 9);
    assert_eq!(*g.get(Index::new(0, 0)).unwrap(), 9);
    assert_eq!(*g.get(Index::new(2, 2)).unwrap(), 0);
}

#[test]
fn iter_region_is_row_major_and_skips_outside() {
    let mut g = Grid::filled(3, 3, 0i32);
    for (i, idx) in Region::new(Index::new(0, 0), 3, 3).indices().enumerate() {
        g.set(idx, i as i32);
    }
    let region = Region::new(Index::new(-1, -1), 3, 3);
    let collected: Vec<i32> = g.iter_region(region).map(|(_, v)| *v).collect();
    // Only the in-bounds corner (0,0)..(1,1) survives.
    assert_eq!(collected, vec![0, 1, 3, 4]);
}

#[test]
fn copy_offsets_materializes_reads_before_writes() {
    let mut g = Grid::filled(5, 1, 0i32);
    for c in 0..5 {
        g.set(Index::new(0, c), c);
    }
    // Shift everything one column to the right using the same buffer as
    // both source and destination.
    let offsets: Vec<Offset> = (0..4).map(|c| Offset::new(0, c)).collect();
    g.copy_offsets(Index::new(0, 0), Index::new(0, 1), &offsets);
    let row: Vec<i32> = (0..5).map(|c| *g.get(Index::new(0, c)).unwrap()).collect();
    assert_eq!(row, vec![0, 0, 1, 2, 3]);
}

#[test]
fn copy_region_copies_full_extent() {
    let mut g = Grid::filled(4, 4, 0i32);
    g.set(Index::new(0, 0), 7);
    g.set(Index::new(0, 1), 8);
    g.set(Index::new(1, 0), 9);
    g.set(Index::new(1, 1), 10);
    let src = Region::new(Index::new(0, 0), 2, 2);
    let dst = Region::new(Index::new(2, 2), 2, 2);
    g.copy_region(src, dst);
    assert_eq!(*g.get(Index::new(2, 2)).unwrap(), 7);
    assert_eq!(*g.get(Index::new(2, 3)).unwrap(), 8);
    assert_eq!(*g.get(Index::new(3, 2)).unwrap(), 9);
    assert_eq!(*g.get(Index::new(3, 3)).unwrap(), 10);
}

#[test]
fn multi_channel_field_get_set() {
    let mut f = MultiChannelField::filled(2, 2, 3, 0.0);
    f.set(Index::new(0, 0), &[1.0, 2.0, 3.0]);
    assert_eq!(f.get(Index::new(0, 0)).unwrap(), &[1.0, 2.0, 3.0]);
    assert_eq!(f.get(Index::new(1, 1)).unwrap(), &[0.0, 0.0, 0.0]);
}

#[test]
fn multi_channel_field_copy_offsets() {
    let mut f = MultiChannelField::filled(3, 1, 1, 0.0);
    f.set(Index::new(0, 0), &[5.0]);
    let offsets = vec![Offset::new(0, 0)];
    f.copy_offsets(Index::new(0, 0), Index::new(0, 2), &offsets);
    assert_eq!(f.get(Index::new(0, 2)).unwrap(), &[5.0]);
}
