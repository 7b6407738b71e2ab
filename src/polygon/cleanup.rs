// Copyright 2025 Lars Brubaker
// License: MIT
//
// Cleanup passes run before loop detection. Each one leaves at least three
// segments or reports TooFewSegments; the array may already have been
// modified when that happens.

use log::debug;

use super::{Polygon, PolygonError};
use crate::geom::Real;
use crate::segment::Segment;

impl<'a, T: Real> Polygon<'a, T> {
    /// Repeatedly drop segments that cannot be part of any closed loop: no
    /// other segment ends where this one starts, or none starts where it ends.
    pub fn remove_unconnected_segments(&mut self, epsilon: T) -> Result<(), PolygonError> {
        self.ensure_open()?;
        let mut removed = 0usize;
        loop {
            let segs = self.segments();
            let dangling = (0..segs.len()).find(|&i| !is_connected(segs, i, epsilon));
            match dangling {
                Some(i) => {
                    self.remove(i)?;
                    removed += 1;
                }
                None => break,
            }
        }
        if removed > 0 {
            debug!("polygon: removed {} unconnected segments", removed);
        }
        self.check_min_segments()
    }

    /// Drop every segment equal (same `p` and `q` within `epsilon`) to an
    /// earlier one.
    pub fn remove_duplicate_segments(&mut self, epsilon: T) -> Result<(), PolygonError> {
        self.ensure_open()?;
        let mut i = 0;
        while i < self.len() {
            let first = self.segments()[i];
            let mut j = i + 1;
            while j < self.len() {
                if self.segments()[j].approx_eq(&first, epsilon) {
                    self.remove(j)?;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
        self.check_min_segments()
    }

    /// Drop zero-length segments and pairs of segments that cancel each other
    /// (one is the exact reverse of the other).
    pub fn remove_redundant_segments(&mut self, epsilon: T) -> Result<(), PolygonError> {
        self.ensure_open()?;

        let mut i = 0;
        while i < self.len() {
            if self.segments()[i].is_degenerate(epsilon) {
                self.remove(i)?;
            } else {
                i += 1;
            }
        }

        let mut i = 0;
        'outer: while i < self.len() {
            let a = self.segments()[i];
            for j in i + 1..self.len() {
                if self.segments()[j].is_reverse_of(&a, epsilon) {
                    // j > i, so removing j first keeps i valid.
                    self.remove(j)?;
                    self.remove(i)?;
                    continue 'outer;
                }
            }
            i += 1;
        }
        self.check_min_segments()
    }

    fn check_min_segments(&self) -> Result<(), PolygonError> {
        let count = self.len();
        if count < 3 {
            return Err(PolygonError::TooFewSegments { count });
        }
        Ok(())
    }
}

fn is_connected<T: Real>(segs: &[Segment<T>], i: usize, epsilon: T) -> bool {
    let seg = &segs[i];
    let mut has_prev = false;
    let mut has_next = false;
    for (j, other) in segs.iter().enumerate() {
        if j == i {
            continue;
        }
        has_prev |= other.connects_to(seg, epsilon);
        has_next |= seg.connects_to(other, epsilon);
        if has_prev && has_next {
            return true;
        }
    }
    false
}
