// Copyright 2025 Lars Brubaker
// Unit tests for the polygon internals.

use super::*;
use crate::stackalloc::StackAllocConfig;

const EPS: f64 = 1e-9;

fn seg(px: f64, py: f64, qx: f64, qy: f64) -> Segment<f64> {
    Segment::xy(px, py, qx, qy)
}

fn unit_square() -> [Segment<f64>; 4] {
    [
        seg(0.0, 0.0, 1.0, 0.0),
        seg(1.0, 0.0, 1.0, 1.0),
        seg(1.0, 1.0, 0.0, 1.0),
        seg(0.0, 1.0, 0.0, 0.0),
    ]
}

#[test]
fn lifecycle_states() {
    let mut arena = StackAlloc::new();
    let mut poly: Polygon<f64> = Polygon::new();
    assert_eq!(poly.state(), PolygonState::Unbound);
    assert_eq!(poly.add_segment(seg(0.0, 0.0, 1.0, 0.0)), Err(PolygonError::NotOpen));

    poly.begin(&mut arena);
    assert_eq!(poly.state(), PolygonState::Open);
    assert!(poly.is_empty());
    poly.add_segments(&unit_square()).unwrap();
    poly.close().unwrap();
    assert_eq!(poly.state(), PolygonState::Closed);
    assert_eq!(poly.len(), 4);
    assert_eq!(poly.segments()[2], unit_square()[2]);
    assert_eq!(poly.remove(0), Err(PolygonError::NotOpen));
    assert_eq!(poly.close(), Err(PolygonError::NotOpen));

    poly.reset();
    assert_eq!(poly.state(), PolygonState::Unbound);
    assert!(poly.segments().is_empty());
}

#[test]
fn reset_after_close_returns_space() {
    let mut arena = StackAlloc::new();
    {
        let mut poly: Polygon<f64> = Polygon::new();
        poly.begin(&mut arena);
        poly.add_segments(&unit_square()).unwrap();
        poly.close().unwrap();
        poly.reset();
    }
    assert_eq!(arena.used(), 0);
}

#[test]
fn insert_and_remove_shift_tail() {
    let mut arena = StackAlloc::new();
    let mut poly = Polygon::new();
    poly.begin(&mut arena);
    let sq = unit_square();
    poly.add_segment(sq[0]).unwrap();
    poly.add_segment(sq[3]).unwrap();
    poly.insert(&sq[1..3], 1).unwrap();
    assert_eq!(poly.segments(), &sq[..]);

    let removed = poly.remove(1).unwrap();
    assert_eq!(removed, sq[1]);
    assert_eq!(poly.segments(), &[sq[0], sq[2], sq[3]][..]);

    assert_eq!(
        poly.insert(&sq[..1], 9),
        Err(PolygonError::IndexOutOfRange { index: 9, len: 3 })
    );
    assert_eq!(
        poly.remove(3),
        Err(PolygonError::IndexOutOfRange { index: 3, len: 3 })
    );
}

#[test]
fn add_segment_failure_leaves_polygon_unchanged() {
    let mut arena = StackAlloc::with_config(StackAllocConfig {
        min_block_len: 2,
        max_len: Some(2),
    });
    let mut poly = Polygon::new();
    poly.begin(&mut arena);
    poly.add_segment(seg(0.0, 0.0, 1.0, 0.0)).unwrap();
    poly.add_segment(seg(1.0, 0.0, 1.0, 1.0)).unwrap();
    let err = poly.add_segment(seg(1.0, 1.0, 0.0, 0.0)).unwrap_err();
    assert!(matches!(err, PolygonError::OutOfMemory(_)));
    assert_eq!(poly.len(), 2);
    assert_eq!(poly.segments()[1], seg(1.0, 0.0, 1.0, 1.0));
    assert!(poly.is_open());
}

#[test]
fn copy_whole_and_range() {
    let mut arena_a = StackAlloc::new();
    let mut arena_b = StackAlloc::new();
    let mut a = Polygon::new();
    a.begin(&mut arena_a);
    a.add_segments(&unit_square()).unwrap();
    a.set_user_data(42);

    let mut b = Polygon::new();
    b.copy_from(&a, &mut arena_b).unwrap();
    assert_eq!(b.segments(), a.segments());
    assert_eq!(b.user_data(), 42);
    assert!(b.is_open());

    b.copy_range(&a, 1, 2).unwrap();
    assert_eq!(b.segments(), &unit_square()[1..3]);
    assert!(matches!(
        b.copy_range(&a, 3, 2),
        Err(PolygonError::IndexOutOfRange { .. })
    ));
}

#[test]
fn reverse_flips_winding() {
    let mut arena = StackAlloc::new();
    let mut poly = Polygon::new();
    poly.begin(&mut arena);
    poly.add_segments(&unit_square()).unwrap();
    assert!((poly.signed_area() - 1.0).abs() < EPS);
    poly.reverse().unwrap();
    assert!(poly.is_closed_loop(EPS));
    assert!((poly.signed_area() + 1.0).abs() < EPS);
    assert_eq!(poly.segments()[0], seg(0.0, 0.0, 0.0, 1.0));
}

#[test]
fn compute_plane_follows_winding() {
    let mut arena = StackAlloc::new();
    let mut poly = Polygon::new();
    poly.begin(&mut arena);
    poly.add_segments(&unit_square()).unwrap();
    let plane = poly.compute_plane().unwrap();
    assert!((plane.normal.z - 1.0).abs() < EPS);
    assert!(plane.d.abs() < EPS);

    poly.reverse().unwrap();
    let plane = poly.compute_plane().unwrap();
    assert!((plane.normal.z + 1.0).abs() < EPS);
    // Measured against its own fitted plane the loop is counter-clockwise.
    assert!((poly.signed_area() - 1.0).abs() < EPS);
}

#[test]
fn compute_plane_rejects_flat_input() {
    let mut arena = StackAlloc::new();
    let mut poly = Polygon::new();
    poly.begin(&mut arena);
    poly.add_segment(seg(0.0, 0.0, 1.0, 0.0)).unwrap();
    poly.add_segment(seg(1.0, 0.0, 0.0, 0.0)).unwrap();
    assert!(poly.compute_plane().is_none());
    assert_eq!(*poly.plane(), Plane::default());
}

#[test]
fn unconnected_segments_are_dropped() {
    let mut arena = StackAlloc::new();
    let mut poly = Polygon::new();
    poly.begin(&mut arena);
    poly.add_segments(&unit_square()).unwrap();
    // Dangling spur off a corner, and a stray far away.
    poly.add_segment(seg(1.0, 1.0, 2.0, 2.0)).unwrap();
    poly.add_segment(seg(5.0, 5.0, 6.0, 5.0)).unwrap();
    poly.remove_unconnected_segments(EPS).unwrap();
    assert_eq!(poly.segments(), &unit_square()[..]);
}

#[test]
fn unconnected_cascade_can_empty_polygon() {
    let mut arena = StackAlloc::new();
    let mut poly = Polygon::new();
    poly.begin(&mut arena);
    poly.add_segment(seg(0.0, 0.0, 1.0, 0.0)).unwrap();
    poly.add_segment(seg(1.0, 0.0, 2.0, 0.0)).unwrap();
    poly.add_segment(seg(2.0, 0.0, 3.0, 0.0)).unwrap();
    assert_eq!(
        poly.remove_unconnected_segments(EPS),
        Err(PolygonError::TooFewSegments { count: 0 })
    );
}

#[test]
fn duplicates_keep_first() {
    let mut arena = StackAlloc::new();
    let mut poly = Polygon::new();
    poly.begin(&mut arena);
    let sq = unit_square();
    poly.add_segments(&sq).unwrap();
    poly.add_segment(seg(1.0, 0.0, 1.0, 1.0 + 1e-12)).unwrap();
    poly.add_segment(sq[0]).unwrap();
    poly.remove_duplicate_segments(1e-9).unwrap();
    assert_eq!(poly.segments(), &sq[..]);

    // Running it again changes nothing.
    poly.remove_duplicate_segments(1e-9).unwrap();
    assert_eq!(poly.segments(), &sq[..]);
}

#[test]
fn redundant_segments_cancel() {
    let mut arena = StackAlloc::new();
    let mut poly = Polygon::new();
    poly.begin(&mut arena);
    let sq = unit_square();
    poly.add_segment(sq[0]).unwrap();
    poly.add_segment(seg(1.0, 0.0, 1.0, 0.0)).unwrap();
    poly.add_segment(seg(1.0, 0.0, 2.0, 0.0)).unwrap();
    poly.add_segment(seg(2.0, 0.0, 1.0, 0.0)).unwrap();
    poly.add_segments(&sq[1..]).unwrap();
    poly.remove_redundant_segments(EPS).unwrap();
    assert_eq!(poly.segments(), &sq[..]);
}

#[test]
fn redundant_pass_reports_too_few() {
    let mut arena = StackAlloc::new();
    let mut poly = Polygon::new();
    poly.begin(&mut arena);
    poly.add_segment(seg(0.0, 0.0, 1.0, 0.0)).unwrap();
    poly.add_segment(seg(1.0, 0.0, 0.0, 0.0)).unwrap();
    poly.add_segment(seg(3.0, 3.0, 3.0, 3.0)).unwrap();
    assert_eq!(
        poly.remove_redundant_segments(EPS),
        Err(PolygonError::TooFewSegments { count: 0 })
    );
}

#[test]
fn connect_edges_groups_loops() {
    let mut arena = StackAlloc::new();
    let mut poly = Polygon::new();
    poly.begin(&mut arena);
    let sq = unit_square();
    let tri = [
        seg(5.0, 5.0, 6.0, 5.0),
        seg(6.0, 5.0, 5.0, 6.0),
        seg(5.0, 6.0, 5.0, 5.0),
    ];
    // Interleave the two loops.
    for s in [sq[2], tri[1], sq[0], tri[0], sq[3], tri[2], sq[1]] {
        poly.add_segment(s).unwrap();
    }
    assert_eq!(poly.count_edges(0, EPS), 0);
    assert_eq!(poly.connect_edges(0, EPS), 4);
    assert_eq!(poly.connect_edges(4, EPS), 3);
    assert_eq!(poly.count_edges(0, EPS), 4);
    assert_eq!(poly.count_edges(4, EPS), 3);
    assert_eq!(poly.connect_edges(7, EPS), 0);
}

#[test]
fn connect_edges_dead_end() {
    let mut arena = StackAlloc::new();
    let mut poly = Polygon::new();
    poly.begin(&mut arena);
    poly.add_segment(seg(0.0, 0.0, 1.0, 0.0)).unwrap();
    poly.add_segment(seg(1.0, 0.0, 1.0, 1.0)).unwrap();
    poly.add_segment(seg(1.0, 1.0, 0.0, 2.0)).unwrap();
    assert_eq!(poly.connect_edges(0, EPS), 0);
}

#[test]
fn finalize_failure_resets() {
    let mut arena = StackAlloc::new();
    let mut poly = Polygon::new();
    poly.begin(&mut arena);
    poly.add_segment(seg(0.0, 0.0, 1.0, 0.0)).unwrap();
    assert!(poly.finalize(EPS).is_err());
    assert_eq!(poly.state(), PolygonState::Unbound);
    assert_eq!(poly.finalize(EPS), Err(PolygonError::NotOpen));
}
