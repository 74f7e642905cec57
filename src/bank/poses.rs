//! Scale x rotation hypothesis grid.

use crate::util::math::linspace;

/// One geometric hypothesis: isotropic scale followed by rotation in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// Isotropic scale factor applied to the template.
    pub scale: f32,
    /// Rotation in degrees (positive turns clockwise in image coordinates).
    pub angle_deg: f32,
}

impl Pose {
    /// Creates a pose.
    pub fn new(scale: f32, angle_deg: f32) -> Self {
        Self { scale, angle_deg }
    }
}

/// Cartesian product of a scale sequence and a rotation sequence.
///
/// Iteration order is fixed: outer loop over scales, inner loop over
/// rotations. Empty sequences produce an empty grid.
#[derive(Clone, Debug, PartialEq)]
pub struct PoseGrid {
    scales: Vec<f32>,
    rotations_deg: Vec<f32>,
}

impl PoseGrid {
    /// Creates a grid from explicit sequences, kept in the given order.
    pub fn new(scales: Vec<f32>, rotations_deg: Vec<f32>) -> Self {
        Self {
            scales,
            rotations_deg,
        }
    }

    /// Creates a grid from inclusive linear spacings of both axes.
    pub fn linspace(
        scale_range: (f32, f32),
        scale_count: usize,
        angle_range_deg: (f32, f32),
        angle_count: usize,
    ) -> Self {
        Self::new(
            linspace(scale_range.0, scale_range.1, scale_count),
            linspace(angle_range_deg.0, angle_range_deg.1, angle_count),
        )
    }

    /// Returns the scale sequence.
    pub fn scales(&self) -> &[f32] {
        &self.scales
    }

    /// Returns the rotation sequence in degrees.
    pub fn rotations_deg(&self) -> &[f32] {
        &self.rotations_deg
    }

    /// Returns the number of poses (`|scales| * |rotations|`).
    pub fn len(&self) -> usize {
        self.scales.len() * self.rotations_deg.len()
    }

    /// Returns true if the grid has no poses.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the pose at a flat index in iteration order.
    pub fn pose_at(&self, idx: usize) -> Option<Pose> {
        let per_scale = self.rotations_deg.len();
        if per_scale == 0 {
            return None;
        }
        let scale = *self.scales.get(idx / per_scale)?;
        let angle_deg = self.rotations_deg[idx % per_scale];
        Some(Pose::new(scale, angle_deg))
    }

    /// Iterates over all poses, scale-major. The iterator is cheap to clone,
    /// so a sweep can be restarted from any saved position.
    pub fn iter(&self) -> PoseIter<'_> {
        PoseIter { grid: self, next: 0 }
    }
}

impl Default for PoseGrid {
    /// Five scales over 0.8-1.2 and sixteen rotations over -90..=90 degrees.
    fn default() -> Self {
        Self::linspace((0.8, 1.2), 5, (-90.0, 90.0), 16)
    }
}

impl<'a> IntoIterator for &'a PoseGrid {
    type Item = Pose;
    type IntoIter = PoseIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over a `PoseGrid`.
#[derive(Clone, Debug)]
pub struct PoseIter<'a> {
    grid: &'a PoseGrid,
    next: usize,
}

impl Iterator for PoseIter<'_> {
    type Item = Pose;

    fn next(&mut self) -> Option<Pose> {
        let pose = self.grid.pose_at(self.next)?;
        self.next += 1;
        Some(pose)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.grid.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PoseIter<'_> {}
