//! ZNCC correlation kernels.
//!
//! A kernel scores one placement of a planned template on the scan image.
//! `scan_full` slides it over every valid placement, keeps each score that
//! reaches `min_score` and optionally folds all scores into a `ScoreMap`.

use crate::candidate::peak::Peak;
use crate::search::ScoreMap;
use crate::template::TemplatePlan;
use crate::ImageView;

/// Scan configuration for kernel evaluations.
#[derive(Clone, Copy, Debug)]
pub struct ScanParams {
    /// Windows whose per-pixel intensity variance is at or below this value
    /// are skipped (flat regions have no defined correlation).
    pub min_var_i: f32,
    /// Inclusive score threshold for reported peaks.
    pub min_score: f32,
}

/// Kernel trait for scoring and scan operations.
pub trait Kernel {
    /// Computes the score with the window's top-left at `(x, y)`.
    ///
    /// Returns `f32::NEG_INFINITY` when the placement is out of range or the
    /// window is flat.
    fn score_at(
        image: ImageView<'_, u8>,
        plan: &TemplatePlan,
        x: usize,
        y: usize,
        min_var_i: f32,
    ) -> f32;

    /// Scans every valid placement in row-major order.
    ///
    /// A template larger than the image in either dimension has no valid
    /// placement and yields no peaks.
    fn scan_full(
        image: ImageView<'_, u8>,
        plan: &TemplatePlan,
        params: ScanParams,
        mut surface: Option<&mut ScoreMap>,
    ) -> Vec<Peak> {
        let Some((max_x, max_y)) = placement_range(image, plan) else {
            return Vec::new();
        };
        let mut peaks = Vec::new();
        for y in 0..=max_y {
            for x in 0..=max_x {
                let score = Self::score_at(image, plan, x, y, params.min_var_i);
                if !score.is_finite() {
                    continue;
                }
                if let Some(map) = surface.as_deref_mut() {
                    map.update(x, y, score);
                }
                if score >= params.min_score {
                    peaks.push(Peak { x, y, score });
                }
            }
        }
        peaks
    }
}

/// Returns the largest valid top-left placement, if any.
pub(crate) fn placement_range(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
) -> Option<(usize, usize)> {
    let max_x = image.width().checked_sub(plan.width())?;
    let max_y = image.height().checked_sub(plan.height())?;
    Some((max_x, max_y))
}

/// Turns the window sums into a ZNCC score.
#[inline]
pub(crate) fn zncc_from_sums(
    dot: f32,
    sum_i: f32,
    sum_i2: f32,
    n: f32,
    var_t: f32,
    min_var_i: f32,
) -> f32 {
    let var_i = sum_i2 - (sum_i * sum_i) / n;
    if var_i <= min_var_i * n {
        return f32::NEG_INFINITY;
    }
    let score = dot / (var_t * var_i).sqrt();
    if score.is_finite() {
        score
    } else {
        f32::NEG_INFINITY
    }
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Kernel used by the scanner: SIMD when available, scalar otherwise.
#[cfg(not(feature = "simd"))]
pub type DefaultKernel = scalar::ZnccScalar;

/// Kernel used by the scanner: SIMD when available, scalar otherwise.
#[cfg(feature = "simd")]
pub type DefaultKernel = simd::ZnccSimd;
