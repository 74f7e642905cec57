//! Row-parallel scan (feature-gated).
//!
//! Each rayon task scores one row of placements into a local buffer; the
//! buffers are concatenated in row order, so the peak list is identical to
//! the sequential `Kernel::scan_full`.

use crate::candidate::peak::Peak;
use crate::kernel::{placement_range, Kernel, ScanParams};
use crate::search::ScoreMap;
use crate::template::TemplatePlan;
use crate::ImageView;
use rayon::prelude::*;

/// Parallel counterpart of `Kernel::scan_full`.
pub fn scan_full_par<K: Kernel>(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
    params: ScanParams,
    surface: Option<&mut ScoreMap>,
) -> Vec<Peak> {
    let Some((max_x, max_y)) = placement_range(image, plan) else {
        return Vec::new();
    };
    let record = surface.is_some();

    let rows: Vec<(Vec<Peak>, Vec<f32>)> = (0..=max_y)
        .into_par_iter()
        .map(|y| {
            let mut peaks = Vec::new();
            let mut scores = if record {
                Vec::with_capacity(max_x + 1)
            } else {
                Vec::new()
            };
            for x in 0..=max_x {
                let score = K::score_at(image, plan, x, y, params.min_var_i);
                if record {
                    scores.push(score);
                }
                if score.is_finite() && score >= params.min_score {
                    peaks.push(Peak { x, y, score });
                }
            }
            (peaks, scores)
        })
        .collect();

    let mut out = Vec::new();
    let mut surface = surface;
    for (y, (peaks, scores)) in rows.into_iter().enumerate() {
        if let Some(map) = surface.as_deref_mut() {
            for (x, score) in scores.into_iter().enumerate() {
                if score.is_finite() {
                    map.update(x, y, score);
                }
            }
        }
        out.extend(peaks);
    }
    out
}
