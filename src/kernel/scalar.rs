//! Scalar reference ZNCC kernel.

use crate::kernel::{placement_range, zncc_from_sums, Kernel};
use crate::template::TemplatePlan;
use crate::ImageView;

/// Scalar zero-mean normalized cross correlation over the full window.
pub struct ZnccScalar;

impl Kernel for ZnccScalar {
    fn score_at(
        image: ImageView<'_, u8>,
        plan: &TemplatePlan,
        x: usize,
        y: usize,
        min_var_i: f32,
    ) -> f32 {
        let Some((max_x, max_y)) = placement_range(image, plan) else {
            return f32::NEG_INFINITY;
        };
        if x > max_x || y > max_y {
            return f32::NEG_INFINITY;
        }

        let tpl_width = plan.width();
        let t_prime = plan.t_prime();
        let mut dot = 0.0f32;
        let mut sum_i = 0.0f32;
        let mut sum_i2 = 0.0f32;

        for ty in 0..plan.height() {
            let Some(img_row) = image.row(y + ty) else {
                return f32::NEG_INFINITY;
            };
            let tpl_row = &t_prime[ty * tpl_width..(ty + 1) * tpl_width];
            for (&t, &pixel) in tpl_row.iter().zip(&img_row[x..x + tpl_width]) {
                let value = f32::from(pixel);
                dot += t * value;
                sum_i += value;
                sum_i2 += value * value;
            }
        }

        zncc_from_sums(
            dot,
            sum_i,
            sum_i2,
            plan.len() as f32,
            plan.var_t(),
            min_var_i,
        )
    }
}
