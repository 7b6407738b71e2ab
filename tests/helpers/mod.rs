// Copyright 2025 Lars Brubaker
// Shared test utilities for loopstitch tests.

#![allow(dead_code)]

use loopstitch::geom::segments_overlap;
use loopstitch::{Polygon, Segment, StackAlloc, Vec3};

pub const EPS: f64 = 1e-9;

/// Closed polyline through `points`, counter-clockwise if the points are.
pub fn ring(points: &[(f64, f64)]) -> Vec<Segment<f64>> {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (px, py) = points[i];
            let (qx, qy) = points[(i + 1) % n];
            Segment::xy(px, py, qx, qy)
        })
        .collect()
}

/// Axis-aligned rectangle, counter-clockwise.
pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Segment<f64>> {
    ring(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
}

/// Axis-aligned rectangle, clockwise (hole winding).
pub fn rect_hole(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Segment<f64>> {
    ring(&[(x0, y0), (x0, y1), (x1, y1), (x1, y0)])
}

/// Deterministic reorder: takes every `stride`-th element, wrapping.
/// `stride` must be coprime with `segs.len()`.
pub fn scatter(segs: &[Segment<f64>], stride: usize) -> Vec<Segment<f64>> {
    let n = segs.len();
    (0..n).map(|i| segs[(i * stride) % n]).collect()
}

/// Open a polygon on `arena`, feed it `segs` one at a time, and finalize.
pub fn finalize_segments<'a>(
    arena: &'a mut StackAlloc<Segment<f64>>,
    segs: &[Segment<f64>],
) -> Result<Polygon<'a, f64>, loopstitch::PolygonError> {
    let mut poly = Polygon::new();
    poly.begin(arena);
    for s in segs {
        poly.add_segment(*s)?;
    }
    poly.finalize(EPS)?;
    Ok(poly)
}

/// Every segment ends where the next one starts (wrapping), and N >= 3.
pub fn assert_closed(segs: &[Segment<f64>], epsilon: f64) {
    let n = segs.len();
    assert!(n >= 3, "closed loop needs at least 3 segments, got {}", n);
    for i in 0..n {
        let next = (i + 1) % n;
        assert!(
            segs[i].q.approx_eq(segs[next].p, epsilon),
            "segment {} ends at {:?} but segment {} starts at {:?}",
            i,
            segs[i].q,
            next,
            segs[next].p
        );
    }
}

/// No two segments cross in their interiors.
pub fn assert_no_crossings(segs: &[Segment<f64>], epsilon: f64) {
    for i in 0..segs.len() {
        for j in i + 1..segs.len() {
            assert!(
                !segments_overlap(&segs[i], &segs[j], epsilon),
                "segments {} {:?} and {} {:?} cross",
                i,
                segs[i],
                j,
                segs[j]
            );
        }
    }
}

/// Number of segments starting at (x, y).
pub fn starts_at(segs: &[Segment<f64>], x: f64, y: f64) -> usize {
    let point = Vec3::xy(x, y);
    segs.iter().filter(|s| s.p.approx_eq(point, EPS)).count()
}
