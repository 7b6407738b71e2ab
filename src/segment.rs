// Copyright 2025 Lars Brubaker
// License: MIT

use crate::geom::{Real, Vec3};

/// A directed edge `p -> q`. Direction defines both winding and connectivity:
/// a loop is traversable when every segment's `q` meets the next one's `p`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Segment<T> {
    pub p: Vec3<T>,
    pub q: Vec3<T>,
}

impl<T: Real> Segment<T> {
    #[inline]
    pub fn new(p: Vec3<T>, q: Vec3<T>) -> Self {
        Segment { p, q }
    }

    /// Segment between two points on the z = 0 plane.
    #[inline]
    pub fn xy(px: T, py: T, qx: T, qy: T) -> Self {
        Segment {
            p: Vec3::xy(px, py),
            q: Vec3::xy(qx, qy),
        }
    }

    #[inline]
    pub fn direction(&self) -> Vec3<T> {
        self.q - self.p
    }

    #[inline]
    pub fn length_squared(&self) -> T {
        self.direction().length_squared()
    }

    #[inline]
    pub fn reversed(&self) -> Self {
        Segment {
            p: self.q,
            q: self.p,
        }
    }

    /// Zero length within `epsilon`.
    #[inline]
    pub fn is_degenerate(&self, epsilon: T) -> bool {
        self.p.approx_eq(self.q, epsilon)
    }

    /// Same endpoints in the same direction.
    #[inline]
    pub fn approx_eq(&self, other: &Self, epsilon: T) -> bool {
        self.p.approx_eq(other.p, epsilon) && self.q.approx_eq(other.q, epsilon)
    }

    /// Same endpoints in opposite directions; the pair cancels out.
    #[inline]
    pub fn is_reverse_of(&self, other: &Self, epsilon: T) -> bool {
        self.p.approx_eq(other.q, epsilon) && self.q.approx_eq(other.p, epsilon)
    }

    /// `other` starts where this segment ends.
    #[inline]
    pub fn connects_to(&self, other: &Self, epsilon: T) -> bool {
        self.q.approx_eq(other.p, epsilon)
    }
}
