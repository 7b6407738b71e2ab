// Copyright 2025 Lars Brubaker
// WASM bindings for loopstitch

use loopstitch::{Polygon, Segment, StackAlloc, StitchConfig};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn main_js() {
    console_error_panic_hook::set_once();
}

/// Accumulates 2D segments, then finalizes them into one stitched loop.
///
/// A `Polygon` borrows its arena, so the segments are staged here and the
/// polygon only lives for the duration of `finalize`.
#[wasm_bindgen]
pub struct PolygonJs {
    arena: StackAlloc<Segment<f64>>,
    staged: Vec<Segment<f64>>,
    result: Vec<Segment<f64>>,
    parallel_weight: f64,
    error: Option<String>,
}

#[wasm_bindgen]
impl PolygonJs {
    #[wasm_bindgen(constructor)]
    pub fn new() -> PolygonJs {
        PolygonJs {
            arena: StackAlloc::new(),
            staged: Vec::new(),
            result: Vec::new(),
            parallel_weight: 0.0,
            error: None,
        }
    }

    pub fn add_segment(&mut self, px: f64, py: f64, qx: f64, qy: f64) {
        self.staged.push(Segment::xy(px, py, qx, qy));
    }

    /// Add segments from a flat [px,py,qx,qy, ...] Float64Array. A trailing
    /// partial segment is ignored.
    pub fn add_segments(&mut self, flat: &[f64]) {
        self.staged
            .extend(flat.chunks_exact(4).map(|c| Segment::xy(c[0], c[1], c[2], c[3])));
    }

    pub fn set_parallel_weight(&mut self, weight: f64) {
        self.parallel_weight = weight;
    }

    pub fn clear(&mut self) {
        self.staged.clear();
        self.result.clear();
        self.error = None;
    }

    /// Clean up, order and stitch the staged segments. Returns true on success;
    /// on failure `error_message` describes why.
    pub fn finalize(&mut self, epsilon: f64) -> bool {
        self.arena.reset();
        self.result.clear();
        let mut poly = Polygon::new();
        poly.begin(&mut self.arena);
        poly.set_stitch_config(StitchConfig {
            parallel_weight: self.parallel_weight,
        });
        let outcome = poly
            .add_segments(&self.staged)
            .and_then(|()| poly.finalize(epsilon));
        match outcome {
            Ok(()) => {
                self.result.extend_from_slice(poly.segments());
                self.error = None;
                true
            }
            Err(err) => {
                self.error = Some(err.to_string());
                false
            }
        }
    }

    pub fn segment_count(&self) -> u32 {
        self.result.len() as u32
    }

    /// Flat [px,py,qx,qy, ...] of the finalized loop, in traversal order.
    pub fn get_segments(&self) -> Vec<f64> {
        flatten(&self.result)
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.clone()
    }
}

impl Default for PolygonJs {
    fn default() -> Self {
        Self::new()
    }
}

fn flatten(segments: &[Segment<f64>]) -> Vec<f64> {
    segments
        .iter()
        .flat_map(|s| [s.p.x, s.p.y, s.q.x, s.q.y])
        .collect()
}

/// Convenience: stitch a flat [px,py,qx,qy, ...] segment soup into one loop.
/// Returns the loop in the same flat layout, or an empty array on failure.
#[wasm_bindgen]
pub fn stitch_segments(flat: &[f64], epsilon: f64) -> Vec<f64> {
    let mut p = PolygonJs::new();
    p.add_segments(flat);
    if !p.finalize(epsilon) {
        return Vec::new();
    }
    p.get_segments()
}
