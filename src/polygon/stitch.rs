// Copyright 2025 Lars Brubaker
// License: MIT
//
// Loop detection and hole stitching.
//
// finalize() groups the cleaned segments into contiguous loops, keeps the
// first loop as the outer boundary and splices every other loop into it
// through a pair of bridge edges (boundary -> hole, hole -> boundary).
// Bridges are picked greedily: shortest first, never crossing an existing
// edge. The search is O(holes * boundary * hole * edges), fine for the handful
// of loops a clipping step produces.

use log::{debug, trace};

use super::{Polygon, PolygonError, PolygonState};
use crate::geom::{overlaps_any, parallel_rating, Real};
use crate::segment::Segment;
use crate::stackalloc::{StackAlloc, StackAllocConfig};

/// One detected loop inside the snapshot taken by finalize().
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct HoleEntry {
    start: usize,
    count: usize,
    copied: bool,
}

impl HoleEntry {
    fn range(&self) -> core::ops::Range<usize> {
        self.start..self.start + self.count
    }
}

#[derive(Copy, Clone, Debug)]
struct Bridge<T> {
    /// Boundary segment whose `p` anchors the bridge; the hole is inserted before it.
    boundary: usize,
    hole_id: usize,
    /// Offset inside the hole's loop of the segment whose `p` the bridge reaches.
    hole_offset: usize,
    /// Anchor points already coincide; no bridge edges are needed.
    coincident: bool,
    score: T,
}

impl<'a, T: Real> Polygon<'a, T> {
    /// Starting at `start`, pull the segment that continues the chain into the
    /// next slot until the chain returns to `segments[start].p`. Returns the
    /// loop length, or 0 if the chain dead-ends (the array is left partially
    /// reordered) or the polygon is not open.
    pub fn connect_edges(&mut self, start: usize, epsilon: T) -> usize {
        if self.state != PolygonState::Open || start >= self.len() {
            return 0;
        }
        let segs = self.segments_mut();
        let n = segs.len();
        let head = segs[start].p;
        let mut cur = start;
        loop {
            let tail = segs[cur].q;
            if tail.approx_eq(head, epsilon) {
                return cur - start + 1;
            }
            match (cur + 1..n).find(|&k| segs[k].p.approx_eq(tail, epsilon)) {
                Some(k) => {
                    segs.swap(cur + 1, k);
                    cur += 1;
                }
                None => return 0,
            }
        }
    }

    /// Length of the closed run starting at `start` in current array order,
    /// or 0 if the run breaks before returning to `segments[start].p`.
    pub fn count_edges(&self, start: usize, epsilon: T) -> usize {
        let segs = self.segments();
        if start >= segs.len() {
            return 0;
        }
        let head = segs[start].p;
        let mut i = start;
        loop {
            if segs[i].q.approx_eq(head, epsilon) {
                return i - start + 1;
            }
            if i + 1 >= segs.len() || !segs[i].connects_to(&segs[i + 1], epsilon) {
                return 0;
            }
            i += 1;
        }
    }

    /// Clean up, order into loops, stitch holes into the first loop and close.
    /// On success the segments form exactly one closed loop of at least three
    /// segments. On failure the polygon is reset and must be rebuilt.
    pub fn finalize(&mut self, epsilon: T) -> Result<(), PolygonError> {
        self.ensure_open()?;
        match self.assemble(epsilon) {
            Ok(()) => self.close(),
            Err(err) => {
                debug!("polygon: finalize failed: {}", err);
                self.reset();
                Err(err)
            }
        }
    }

    fn assemble(&mut self, epsilon: T) -> Result<(), PolygonError> {
        self.remove_unconnected_segments(epsilon)?;
        self.remove_duplicate_segments(epsilon)?;
        self.remove_redundant_segments(epsilon)?;

        let mut loops = 0;
        let mut pos = 0;
        while pos < self.len() {
            let count = self.connect_edges(pos, epsilon);
            if count == 0 {
                return Err(PolygonError::Unclosed { start: pos });
            }
            pos += count;
            loops += 1;
        }
        debug!("polygon: {} segments in {} loops", self.len(), loops);

        if loops > 1 {
            self.merge_holes(loops, epsilon)?;
        }
        if !self.is_closed_loop(epsilon) {
            return Err(PolygonError::Unclosed { start: 0 });
        }
        Ok(())
    }

    fn merge_holes(&mut self, loops: usize, epsilon: T) -> Result<(), PolygonError> {
        let config = self
            .arena
            .as_ref()
            .map_or_else(StackAllocConfig::default, |arena| arena.config());

        let mut table_arena = StackAlloc::<HoleEntry>::with_config(config);
        let table = table_arena.alloc(loops)?;
        let holes = table_arena.slice_mut(&table);
        let mut pos = 0;
        for entry in holes.iter_mut() {
            let count = self.count_edges(pos, epsilon);
            if count == 0 {
                return Err(PolygonError::Unclosed { start: pos });
            }
            *entry = HoleEntry {
                start: pos,
                count,
                copied: false,
            };
            pos += count;
        }

        let mut scratch = StackAlloc::with_config(config);
        let mut snapshot = Polygon::new();
        snapshot.copy_from(self, &mut scratch)?;

        self.copy_range(&snapshot, holes[0].start, holes[0].count)?;
        holes[0].copied = true;

        let weight = self.config.parallel_weight;
        for remaining in (1..loops).rev() {
            let bridge = find_bridge(self.segments(), snapshot.segments(), holes, epsilon, weight)
                .ok_or(PolygonError::Unmergeable { remaining })?;
            let hole = &snapshot.segments()[holes[bridge.hole_id].range()];
            debug!(
                "polygon: hole {} ({} segments) joins boundary at segment {}{}",
                bridge.hole_id,
                hole.len(),
                bridge.boundary,
                if bridge.coincident { ", touching" } else { "" }
            );
            self.splice_hole(&bridge, hole)?;
            holes[bridge.hole_id].copied = true;
        }
        Ok(())
    }

    /// Insert `hole` (one closed loop) in front of boundary segment
    /// `bridge.boundary`, rotated to start at `bridge.hole_offset`, wrapped in
    /// bridge edges unless the anchor points coincide.
    fn splice_hole(&mut self, bridge: &Bridge<T>, hole: &[Segment<T>]) -> Result<(), PolygonError> {
        let at = bridge.boundary;
        let (tail, head) = hole.split_at(bridge.hole_offset);
        if bridge.coincident {
            self.insert(head, at)?;
            self.insert(tail, at + head.len())?;
            return Ok(());
        }
        let from = self.segments()[at].p;
        let to = head[0].p;
        self.insert(&[Segment::new(from, to), Segment::new(to, from)], at)?;
        self.insert(head, at + 1)?;
        self.insert(tail, at + 1 + head.len())?;
        Ok(())
    }
}

/// Best bridge from the current boundary to any unmerged hole.
fn find_bridge<T: Real>(
    boundary: &[Segment<T>],
    snapshot: &[Segment<T>],
    holes: &[HoleEntry],
    epsilon: T,
    parallel_weight: T,
) -> Option<Bridge<T>> {
    let mut best: Option<Bridge<T>> = None;
    for (hole_id, entry) in holes.iter().enumerate() {
        if entry.copied {
            continue;
        }
        let hole = &snapshot[entry.range()];
        for (bi, b) in boundary.iter().enumerate() {
            for (hj, h) in hole.iter().enumerate() {
                let dist_sq = b.p.distance_squared(h.p);
                if dist_sq <= epsilon * epsilon {
                    return Some(Bridge {
                        boundary: bi,
                        hole_id,
                        hole_offset: hj,
                        coincident: true,
                        score: T::zero(),
                    });
                }

                let candidate = Segment::new(b.p, h.p);
                if crosses_open_geometry(&candidate, boundary, snapshot, holes, epsilon) {
                    trace!("polygon: bridge {:?} -> {:?} crosses an edge", b.p, h.p);
                    continue;
                }

                let mut score = T::one() / dist_sq.sqrt();
                if parallel_weight != T::zero() {
                    score += parallel_weight * parallel_rating(&candidate, boundary.iter().chain(hole));
                }
                if best.as_ref().map_or(true, |cur| score > cur.score) {
                    best = Some(Bridge {
                        boundary: bi,
                        hole_id,
                        hole_offset: hj,
                        coincident: false,
                        score,
                    });
                }
            }
        }
    }
    best
}

/// A bridge may not cross the boundary or any hole that is still waiting to
/// be merged.
fn crosses_open_geometry<T: Real>(
    candidate: &Segment<T>,
    boundary: &[Segment<T>],
    snapshot: &[Segment<T>],
    holes: &[HoleEntry],
    epsilon: T,
) -> bool {
    overlaps_any(candidate, boundary, epsilon)
        || holes
            .iter()
            .filter(|entry| !entry.copied)
            .any(|entry| overlaps_any(candidate, &snapshot[entry.range()], epsilon))
}
