//! Best-score surfaces kept for diagnostics.

/// Running per-placement maximum of correlation scores at scan resolution.
///
/// Cells start at zero, so negative correlations never show up. The map is a
/// pure side channel: candidate selection never reads it.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreMap {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl ScoreMap {
    /// Creates a zeroed map.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Returns the map width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the map height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the scores in row-major order.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the score at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Raises cell `(x, y)` to `score` if that is larger. Out-of-range cells
    /// are ignored.
    pub fn update(&mut self, x: usize, y: usize, score: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let cell = &mut self.data[y * self.width + x];
        if score > *cell {
            *cell = score;
        }
    }

    /// Returns the largest score in the map.
    pub fn max_score(&self) -> f32 {
        self.data.iter().copied().fold(0.0, f32::max)
    }
}

/// Best-score surface of one template across all of its poses.
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledScoreMap {
    pub label: u32,
    pub map: ScoreMap,
}
