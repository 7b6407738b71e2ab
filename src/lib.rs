// Copyright 2025 Lars Brubaker
// License: MIT
//
// loopstitch: rebuilds a single closed polygon loop from an unordered bag of
// directed segments, stitching interior loops (holes) into the outer boundary.

pub mod geom;
pub mod polygon;
pub mod segment;
pub mod stackalloc;

pub use geom::{Plane, Real, Vec3};
pub use polygon::{Polygon, PolygonError, PolygonState, StitchConfig};
pub use segment::Segment;
pub use stackalloc::{AllocError, Allocation, StackAlloc, StackAllocConfig};
