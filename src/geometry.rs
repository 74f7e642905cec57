//! Footprint geometry: points, sizes, oriented rectangles and their rasters.
//!
//! Coordinates are continuous pixel-edge coordinates: pixel `(x, y)` covers
//! `[x, x + 1) x [y, y + 1)` and its center sits at `(x + 0.5, y + 0.5)`.

use crate::util::math::sin_cos_deg;

/// Point in full-resolution image coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Width and height in full-resolution pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size2 {
    pub width: f32,
    pub height: f32,
}

impl Size2 {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Horizontal run of pixels `[x0, x1)` on row `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub y: usize,
    pub x0: usize,
    pub x1: usize,
}

impl Span {
    /// Number of pixels in the run.
    pub fn len(&self) -> usize {
        self.x1 - self.x0
    }

    /// Returns true for an empty run.
    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0
    }
}

/// Rectangle of `size` centered at `center`, rotated by `angle_deg`
/// (clockwise in image coordinates, matching template rotation).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedRect {
    pub center: Point2,
    pub size: Size2,
    pub angle_deg: f32,
}

impl OrientedRect {
    pub fn new(center: Point2, size: Size2, angle_deg: f32) -> Self {
        Self {
            center,
            size,
            angle_deg,
        }
    }

    /// Returns the corners in order around the outline.
    pub fn corners(&self) -> [Point2; 4] {
        let (sin_a, cos_a) = sin_cos_deg(self.angle_deg);
        let hw = self.size.width * 0.5;
        let hh = self.size.height * 0.5;
        [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)].map(|(dx, dy)| {
            Point2::new(
                self.center.x + cos_a * dx - sin_a * dy,
                self.center.y + sin_a * dx + cos_a * dy,
            )
        })
    }

    /// Rasterizes the rectangle into row spans clipped to `width x height`.
    ///
    /// A pixel belongs to the footprint when its center lies inside the
    /// polygon; edges are half-open so adjacent footprints do not share
    /// pixels.
    pub fn raster_spans(&self, width: usize, height: usize) -> Vec<Span> {
        polygon_spans(&self.corners(), width, height)
    }
}

/// Scanline rasterization of a convex polygon.
pub(crate) fn polygon_spans(poly: &[Point2], width: usize, height: usize) -> Vec<Span> {
    if poly.len() < 3 || width == 0 || height == 0 {
        return Vec::new();
    }
    if poly.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Vec::new();
    }
    let min_y = poly.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
    let max_y = poly.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
    let row_start = (min_y - 0.5).ceil().max(0.0) as usize;
    let row_end = ((max_y - 0.5).ceil().max(0.0) as usize).min(height);

    let mut spans = Vec::new();
    for y in row_start..row_end {
        let yc = y as f32 + 0.5;
        let mut left = f32::INFINITY;
        let mut right = f32::NEG_INFINITY;
        for (i, a) in poly.iter().enumerate() {
            let b = poly[(i + 1) % poly.len()];
            let (lo, hi) = if a.y <= b.y { (*a, b) } else { (b, *a) };
            if yc < lo.y || yc >= hi.y {
                continue;
            }
            let t = (yc - lo.y) / (hi.y - lo.y);
            let x = lo.x + t * (hi.x - lo.x);
            left = left.min(x);
            right = right.max(x);
        }
        if left > right {
            continue;
        }
        let x0 = (left - 0.5).ceil().max(0.0) as usize;
        let x1 = ((right - 0.5).ceil().max(0.0) as usize).min(width);
        if x0 < x1 {
            spans.push(Span { y, x0, x1 });
        }
    }
    spans
}
