//! SIMD-accelerated ZNCC kernel using the `wide` crate.
//!
//! The inner template row loop is vectorized to process 8 pixels at a time
//! with `f32x8`; row tails fall back to scalar accumulation.

use crate::kernel::{placement_range, zncc_from_sums, Kernel};
use crate::template::TemplatePlan;
use crate::ImageView;
use wide::f32x8;

const LANES: usize = 8;

#[inline]
fn load_u8x8_as_f32x8(slice: &[u8]) -> f32x8 {
    f32x8::from([
        f32::from(slice[0]),
        f32::from(slice[1]),
        f32::from(slice[2]),
        f32::from(slice[3]),
        f32::from(slice[4]),
        f32::from(slice[5]),
        f32::from(slice[6]),
        f32::from(slice[7]),
    ])
}

#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

#[inline]
fn hsum(v: f32x8) -> f32 {
    v.to_array().iter().sum()
}

/// SIMD zero-mean normalized cross correlation over the full window.
pub struct ZnccSimd;

impl Kernel for ZnccSimd {
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
        let simd_end = tpl_width / LANES * LANES;

        let mut dot_vec = f32x8::ZERO;
        let mut sum_i_vec = f32x8::ZERO;
        let mut sum_i2_vec = f32x8::ZERO;
        let mut dot_s = 0.0f32;
        let mut sum_i_s = 0.0f32;
        let mut sum_i2_s = 0.0f32;

        for ty in 0..plan.height() {
            let Some(img_row) = image.row(y + ty) else {
                return f32::NEG_INFINITY;
            };
            let base = ty * tpl_width;

            let mut tx = 0;
            while tx < simd_end {
                let img_vals = load_u8x8_as_f32x8(&img_row[x + tx..]);
                let tpl_vals = load_f32x8(&t_prime[base + tx..]);
                dot_vec += tpl_vals * img_vals;
                sum_i_vec += img_vals;
                sum_i2_vec += img_vals * img_vals;
                tx += LANES;
            }
            while tx < tpl_width {
                let value = f32::from(img_row[x + tx]);
                dot_s += t_prime[base + tx] * value;
                sum_i_s += value;
                sum_i2_s += value * value;
                tx += 1;
            }
        }

        zncc_from_sums(
            hsum(dot_vec) + dot_s,
            hsum(sum_i_vec) + sum_i_s,
            hsum(sum_i2_vec) + sum_i2_s,
            plan.len() as f32,
            plan.var_t(),
            min_var_i,
        )
    }
}
