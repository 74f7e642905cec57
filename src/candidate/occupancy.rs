//! Binary raster of pixels claimed by accepted detections.

use crate::geometry::Span;

/// Full-resolution occupancy raster. Pixels only ever turn on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyMask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl OccupancyMask {
    /// Creates an empty mask over `width x height`.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    /// Returns the mask width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the mask height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns whether pixel `(x, y)` is occupied (false outside the mask).
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bits[y * self.width + x]
    }

    /// Returns the number of occupied pixels.
    pub fn occupied_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Returns true if no pixel is occupied.
    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|&b| b)
    }

    /// Counts occupied pixels under `spans`.
    pub fn count_overlap(&self, spans: &[Span]) -> usize {
        spans
            .iter()
            .map(|s| {
                let row = s.y * self.width;
                self.bits[row + s.x0..row + s.x1]
                    .iter()
                    .filter(|&&b| b)
                    .count()
            })
            .sum()
    }

    /// Marks every pixel under `spans` as occupied (OR-combine).
    pub fn fill(&mut self, spans: &[Span]) {
        for s in spans {
            let row = s.y * self.width;
            self.bits[row + s.x0..row + s.x1].fill(true);
        }
    }
}
