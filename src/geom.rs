// Copyright 2025 Lars Brubaker
// License: MIT
//
// Geometric kernel shared by the cleanup passes and the hole stitcher.
//
// Everything here is a pure function of its inputs. Points live in the
// polygon's own 3D coordinate space; loops are expected to be planar but no
// projection is performed, so the closest-point math works directly in 3D.

use core::fmt::Debug;
use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use num_traits::Float;

use crate::segment::Segment;

/// Scalar type a polygon is built over. Any `num_traits::Float` with the
/// usual derives qualifies, which in practice means `f32` and `f64`.
pub trait Real: Float + Debug + Default + AddAssign + SubAssign {}

impl<T> Real for T where T: Float + Debug + Default + AddAssign + SubAssign {}

#[inline]
fn clamp01<T: Real>(v: T) -> T {
    if v < T::zero() {
        T::zero()
    } else if v > T::one() {
        T::one()
    } else {
        v
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T: Real> Vec3<T> {
    #[inline]
    pub const fn new(x: T, y: T, z: T) -> Self {
        Vec3 { x, y, z }
    }

    /// A point on the z = 0 plane.
    #[inline]
    pub fn xy(x: T, y: T) -> Self {
        Vec3 { x, y, z: T::zero() }
    }

    #[inline]
    pub fn dot(self, o: Self) -> T {
        self.x * o.x + self.y * o.y + self.z * o.z
    }

    #[inline]
    pub fn cross(self, o: Self) -> Self {
        Vec3 {
            x: self.y * o.z - self.z * o.y,
            y: self.z * o.x - self.x * o.z,
            z: self.x * o.y - self.y * o.x,
        }
    }

    #[inline]
    pub fn length_squared(self) -> T {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> T {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn distance_squared(self, o: Self) -> T {
        (self - o).length_squared()
    }

    /// Unit vector in the same direction, or `None` for a zero (or
    /// underflowing) vector.
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len <= T::zero() || !len.is_finite() {
            return None;
        }
        Some(self * (T::one() / len))
    }

    /// True if `o` lies within `epsilon` of this point.
    #[inline]
    pub fn approx_eq(self, o: Self, epsilon: T) -> bool {
        self.distance_squared(o) <= epsilon * epsilon
    }
}

impl<T: Real> Add for Vec3<T> {
    type Output = Self;
    #[inline]
    fn add(self, o: Self) -> Self {
        Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl<T: Real> Sub for Vec3<T> {
    type Output = Self;
    #[inline]
    fn sub(self, o: Self) -> Self {
        Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl<T: Real> Mul<T> for Vec3<T> {
    type Output = Self;
    #[inline]
    fn mul(self, k: T) -> Self {
        Vec3::new(self.x * k, self.y * k, self.z * k)
    }
}

impl<T: Real> Neg for Vec3<T> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// Supporting plane of a polygon: points `x` with `normal · x + d == 0`.
/// The normal's direction defines which winding counts as counter-clockwise.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Plane<T> {
    pub normal: Vec3<T>,
    pub d: T,
}

impl<T: Real> Plane<T> {
    pub fn new(normal: Vec3<T>, d: T) -> Self {
        Plane { normal, d }
    }

    /// Plane through `point` with the given normal.
    pub fn from_point_normal(point: Vec3<T>, normal: Vec3<T>) -> Self {
        Plane {
            normal,
            d: -normal.dot(point),
        }
    }

    pub fn signed_distance(&self, point: Vec3<T>) -> T {
        self.normal.dot(point) + self.d
    }

    pub fn flipped(&self) -> Self {
        Plane {
            normal: -self.normal,
            d: -self.d,
        }
    }
}

impl<T: Real> Default for Plane<T> {
    /// The z = 0 plane facing +z.
    fn default() -> Self {
        Plane {
            normal: Vec3::new(T::zero(), T::zero(), T::one()),
            d: T::zero(),
        }
    }
}

/// Result of [`closest_points`].
///
/// `s` and `t` are the clamped parameters along the first and second segment.
/// `real_s` and `real_t` are the parameters of the closest points between the
/// two infinite lines before clamping; for parallel or zero-length input they
/// fall back to the same values the clamped search started from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClosestPoints<T> {
    pub dist_sq: T,
    pub s: T,
    pub t: T,
    pub real_s: T,
    pub real_t: T,
}

/// Closest points between segments `a` and `b`.
///
/// A segment counts as a point when its squared length is within machine
/// epsilon of the pair's combined squared length, so the result does not
/// depend on the absolute scale of the coordinates.
pub fn closest_points<T: Real>(a: &Segment<T>, b: &Segment<T>) -> ClosestPoints<T> {
    let d1 = a.q - a.p;
    let d2 = b.q - b.p;
    let r = a.p - b.p;
    let len1 = d1.length_squared();
    let len2 = d2.length_squared();
    let f = d2.dot(r);
    let tiny = T::epsilon() * (len1 + len2);

    let (s, t, real_s, real_t);
    if len1 <= tiny && len2 <= tiny {
        // Both segments are points.
        s = T::zero();
        t = T::zero();
        real_s = T::zero();
        real_t = T::zero();
    } else if len1 <= tiny {
        s = T::zero();
        real_s = T::zero();
        real_t = f / len2;
        t = clamp01(real_t);
    } else {
        let c = d1.dot(r);
        if len2 <= tiny {
            t = T::zero();
            real_t = T::zero();
            real_s = -c / len1;
            s = clamp01(real_s);
        } else {
            let b = d1.dot(d2);
            let denom = len1 * len2 - b * b;
            // Parallel lines have no unique closest pair; start from s = 0.
            let line_s = if denom > T::epsilon() * len1 * len2 {
                (b * f - c * len2) / denom
            } else {
                T::zero()
            };
            real_s = line_s;
            real_t = (b * line_s + f) / len2;

            let mut cs = clamp01(line_s);
            let tnom = b * cs + f;
            let ct;
            if tnom < T::zero() {
                ct = T::zero();
                cs = clamp01(-c / len1);
            } else if tnom > len2 {
                ct = T::one();
                cs = clamp01((b - c) / len1);
            } else {
                ct = tnom / len2;
            }
            s = cs;
            t = ct;
        }
    }

    let c1 = a.p + d1 * s;
    let c2 = b.p + d2 * t;
    ClosestPoints {
        dist_sq: c1.distance_squared(c2),
        s,
        t,
        real_s,
        real_t,
    }
}

#[inline]
fn strictly_inside<T: Real>(v: T) -> bool {
    v > T::zero() && v < T::one()
}

/// True when `a` and `b` cross in their interiors: the closest points lie
/// strictly inside both segments and coincide. Segments sharing an endpoint
/// within `epsilon` only touch there and never overlap.
///
/// Coincidence allows `epsilon` plus a rounding slack proportional to the
/// segments' squared lengths, so an exact `epsilon` of 0 still sees crossings
/// at any scale. Input is assumed planar.
///
/// Parallel and collinear pairs are never reported: their line parameters
/// are pinned to 0. A bridge lying along an existing edge is therefore
/// accepted, and so is the return edge lying on its own bridge.
pub fn segments_overlap<T: Real>(a: &Segment<T>, b: &Segment<T>, epsilon: T) -> bool {
    if shares_endpoint(a, b, epsilon) {
        return false;
    }
    let cp = closest_points(a, b);
    let slack = T::epsilon() * (a.length_squared() + b.length_squared());
    cp.dist_sq <= epsilon * epsilon + slack
        && strictly_inside(cp.s)
        && strictly_inside(cp.t)
        && strictly_inside(cp.real_s)
        && strictly_inside(cp.real_t)
}

fn shares_endpoint<T: Real>(a: &Segment<T>, b: &Segment<T>, epsilon: T) -> bool {
    [a.p, a.q]
        .iter()
        .any(|&u| u.approx_eq(b.p, epsilon) || u.approx_eq(b.q, epsilon))
}

/// True if `candidate` crosses any of `segments`.
pub fn overlaps_any<T: Real>(candidate: &Segment<T>, segments: &[Segment<T>], epsilon: T) -> bool {
    segments
        .iter()
        .any(|seg| segments_overlap(candidate, seg, epsilon))
}

/// How far `candidate` is from being parallel to the closest-to-parallel of
/// `segments`: the minimum of `|dir(candidate) × dir(seg)|²` over unit
/// directions. 0 means parallel to something, 1 means perpendicular to all.
/// Zero-length segments are ignored.
pub fn parallel_rating<'s, T, I>(candidate: &Segment<T>, segments: I) -> T
where
    T: Real + 's,
    I: IntoIterator<Item = &'s Segment<T>>,
{
    let dir = match candidate.direction().normalized() {
        Some(d) => d,
        None => return T::zero(),
    };
    let mut best = T::one();
    for seg in segments {
        if let Some(other) = seg.direction().normalized() {
            let rating = dir.cross(other).length_squared();
            if rating < best {
                best = rating;
            }
        }
    }
    best
}
