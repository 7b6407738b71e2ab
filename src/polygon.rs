// Copyright 2025 Lars Brubaker
// License: MIT
//
// Polygon assembler: an ordered array of directed segments living in one
// StackAlloc allocation, plus a supporting plane and an opaque user tag.
//
// Lifecycle: Unbound -> begin() -> Open -> add/insert/remove* -> close() or
// finalize() -> Closed. reset() returns to Unbound from any state, and a
// failed finalize() resets as well.
//
// The cleanup passes live in polygon/cleanup.rs, loop detection and hole
// stitching in polygon/stitch.rs.

mod cleanup;
mod stitch;

#[cfg(test)]
mod tests;

use log::debug;
use thiserror::Error;

use crate::geom::{Plane, Real, Vec3};
use crate::segment::Segment;
use crate::stackalloc::{AllocError, Allocation, StackAlloc};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PolygonState {
    Unbound,
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolygonError {
    #[error("polygon is not open for modification")]
    NotOpen,
    #[error("index {index} out of range for {len} segments")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("out of memory: {0}")]
    OutOfMemory(#[from] AllocError),
    #[error("only {count} segments left, a loop needs at least 3")]
    TooFewSegments { count: usize },
    #[error("loop starting at segment {start} does not close")]
    Unclosed { start: usize },
    #[error("no bridge to the remaining {remaining} holes avoids crossing existing edges")]
    Unmergeable { remaining: usize },
}

/// Tuning for hole stitching.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StitchConfig<T> {
    /// Weight of the parallelism rating added to the inverse-distance score of
    /// a candidate bridge. At 0 (the default) the shortest bridge that crosses
    /// nothing wins and the rating is never computed.
    pub parallel_weight: T,
}

impl<T: Real> Default for StitchConfig<T> {
    fn default() -> Self {
        Self {
            parallel_weight: T::zero(),
        }
    }
}

pub struct Polygon<'a, T: Real> {
    arena: Option<&'a mut StackAlloc<Segment<T>>>,
    alloc: Option<Allocation>,
    state: PolygonState,
    plane: Plane<T>,
    user_data: usize,
    config: StitchConfig<T>,
}

impl<'a, T: Real> Polygon<'a, T> {
    pub fn new() -> Self {
        Polygon {
            arena: None,
            alloc: None,
            state: PolygonState::Unbound,
            plane: Plane::default(),
            user_data: 0,
            config: StitchConfig::default(),
        }
    }

    /// Bind to `arena` and open with zero segments. Any previous contents are
    /// released first.
    pub fn begin(&mut self, arena: &'a mut StackAlloc<Segment<T>>) {
        self.reset();
        // Whatever was still resizable in the arena belongs to someone else.
        arena.done();
        self.arena = Some(arena);
        self.state = PolygonState::Open;
    }

    /// Seal the allocation. Segments stay readable; no further growth.
    pub fn close(&mut self) -> Result<(), PolygonError> {
        self.ensure_open()?;
        if let Some(arena) = self.arena.as_mut() {
            arena.done();
        }
        self.state = PolygonState::Closed;
        Ok(())
    }

    /// Drop all segments, release the allocation and unbind from the arena.
    /// Plane, user tag and stitch config are kept.
    pub fn reset(&mut self) {
        if let (Some(arena), Some(alloc)) = (self.arena.as_mut(), self.alloc) {
            match self.state {
                PolygonState::Open => arena.free(),
                PolygonState::Closed => {
                    arena.pop(&alloc);
                }
                PolygonState::Unbound => {}
            }
        }
        self.arena = None;
        self.alloc = None;
        self.state = PolygonState::Unbound;
    }

    // ─────── Accessors ────────────────────────────────────────────────────────

    pub fn state(&self) -> PolygonState { self.state }
    pub fn is_open(&self) -> bool { self.state == PolygonState::Open }
    pub fn len(&self) -> usize { self.alloc.map_or(0, |a| a.len()) }
    pub fn is_empty(&self) -> bool { self.len() == 0 }
    pub fn plane(&self) -> &Plane<T> { &self.plane }
    pub fn set_plane(&mut self, plane: Plane<T>) { self.plane = plane; }
    pub fn user_data(&self) -> usize { self.user_data }
    pub fn set_user_data(&mut self, user_data: usize) { self.user_data = user_data; }
    pub fn stitch_config(&self) -> &StitchConfig<T> { &self.config }
    pub fn set_stitch_config(&mut self, config: StitchConfig<T>) { self.config = config; }

    pub fn segments(&self) -> &[Segment<T>] {
        match (&self.arena, &self.alloc) {
            (Some(arena), Some(alloc)) => arena.slice(alloc),
            _ => &[],
        }
    }

    fn segments_mut(&mut self) -> &mut [Segment<T>] {
        match (&mut self.arena, &self.alloc) {
            (Some(arena), Some(alloc)) => arena.slice_mut(alloc),
            _ => &mut [],
        }
    }

    fn ensure_open(&self) -> Result<(), PolygonError> {
        if self.state == PolygonState::Open {
            Ok(())
        } else {
            Err(PolygonError::NotOpen)
        }
    }

    fn resize(&mut self, len: usize) -> Result<(), PolygonError> {
        let arena = self.arena.as_mut().ok_or(PolygonError::NotOpen)?;
        self.alloc = Some(arena.realloc(len)?);
        Ok(())
    }

    // ─────── Mutation ─────────────────────────────────────────────────────────

    /// Append one segment. On allocation failure the polygon is unchanged.
    pub fn add_segment(&mut self, segment: Segment<T>) -> Result<(), PolygonError> {
        self.ensure_open()?;
        let n = self.len();
        self.resize(n + 1)?;
        self.segments_mut()[n] = segment;
        Ok(())
    }

    pub fn add_segments(&mut self, segments: &[Segment<T>]) -> Result<(), PolygonError> {
        let n = self.len();
        self.insert(segments, n)
    }

    /// Insert `segments` so the first of them lands at `index`.
    pub fn insert(&mut self, segments: &[Segment<T>], index: usize) -> Result<(), PolygonError> {
        self.ensure_open()?;
        let n = self.len();
        if index > n {
            return Err(PolygonError::IndexOutOfRange { index, len: n });
        }
        if segments.is_empty() {
            return Ok(());
        }
        let count = segments.len();
        self.resize(n + count)?;
        let segs = self.segments_mut();
        segs.copy_within(index..n, index + count);
        segs[index..index + count].copy_from_slice(segments);
        Ok(())
    }

    /// Remove and return the segment at `index`.
    pub fn remove(&mut self, index: usize) -> Result<Segment<T>, PolygonError> {
        self.ensure_open()?;
        let n = self.len();
        if index >= n {
            return Err(PolygonError::IndexOutOfRange { index, len: n });
        }
        let segs = self.segments_mut();
        let removed = segs[index];
        segs.copy_within(index + 1..n, index);
        self.resize(n - 1)?;
        Ok(removed)
    }

    /// Remove every segment; the polygon stays open.
    pub fn clear(&mut self) -> Result<(), PolygonError> {
        self.ensure_open()?;
        if self.alloc.is_some() {
            self.resize(0)?;
        }
        Ok(())
    }

    /// Flip the winding: reverse the order and the direction of every segment.
    pub fn reverse(&mut self) -> Result<(), PolygonError> {
        self.ensure_open()?;
        let segs = self.segments_mut();
        segs.reverse();
        for seg in segs.iter_mut() {
            *seg = seg.reversed();
        }
        Ok(())
    }

    /// Bind to `arena` and duplicate all of `source`: segments, plane, user
    /// tag and stitch config. The copy is left open.
    pub fn copy_from(
        &mut self,
        source: &Polygon<'_, T>,
        arena: &'a mut StackAlloc<Segment<T>>,
    ) -> Result<(), PolygonError> {
        self.begin(arena);
        self.plane = source.plane;
        self.user_data = source.user_data;
        self.config = source.config;
        let src = source.segments();
        self.resize(src.len())?;
        self.segments_mut().copy_from_slice(src);
        Ok(())
    }

    /// Replace this polygon's segments with `source[start..start + count]`.
    pub fn copy_range(
        &mut self,
        source: &Polygon<'_, T>,
        start: usize,
        count: usize,
    ) -> Result<(), PolygonError> {
        self.ensure_open()?;
        let src = source.segments();
        let end = start.saturating_add(count);
        if end > src.len() {
            return Err(PolygonError::IndexOutOfRange {
                index: end,
                len: src.len(),
            });
        }
        self.resize(count)?;
        self.segments_mut().copy_from_slice(&src[start..end]);
        Ok(())
    }

    // ─────── Queries ──────────────────────────────────────────────────────────

    /// True when the segments form one closed loop in array order: every
    /// segment's `q` meets the next one's `p` (wrapping) and there are at
    /// least three of them.
    pub fn is_closed_loop(&self, epsilon: T) -> bool {
        let segs = self.segments();
        let n = segs.len();
        n >= 3 && (0..n).all(|i| segs[i].connects_to(&segs[(i + 1) % n], epsilon))
    }

    /// Fit the supporting plane to the segments with Newell's method and store
    /// it. Returns `None` (plane unchanged) when the segments enclose no area.
    pub fn compute_plane(&mut self) -> Option<Plane<T>> {
        let segs = self.segments();
        let first = segs.first()?.p;
        let mut n = Vec3::new(T::zero(), T::zero(), T::zero());
        for seg in segs {
            let (p, q) = (seg.p, seg.q);
            n.x += (p.y - q.y) * (p.z + q.z);
            n.y += (p.z - q.z) * (p.x + q.x);
            n.z += (p.x - q.x) * (p.y + q.y);
        }
        let normal = n.normalized()?;
        let plane = Plane::from_point_normal(first, normal);
        debug!("polygon: fitted plane normal {:?}", plane.normal);
        self.plane = plane;
        Some(plane)
    }

    /// Enclosed area measured along the plane normal: positive when the loop
    /// winds counter-clockwise about it. Holes stitched in with opposite
    /// winding subtract.
    pub fn signed_area(&self) -> T {
        let mut sum = Vec3::new(T::zero(), T::zero(), T::zero());
        for seg in self.segments() {
            sum = sum + seg.p.cross(seg.q);
        }
        sum.dot(self.plane.normal) / (T::one() + T::one())
    }
}

impl<'a, T: Real> Default for Polygon<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}
