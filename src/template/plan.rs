//! Template statistics precomputed for ZNCC scoring.

use crate::image::ImageView;
use crate::util::{DiceMatchError, DiceMatchResult};

/// Zero-mean template buffer and its energy for ZNCC.
///
/// With `t' = t - mean(t)` and `var_t = sum(t'^2)`, the score of a window `I`
/// is `sum(t' * I) / sqrt(var_t * (sum(I^2) - sum(I)^2 / n))`. The window mean
/// drops out of the numerator because `sum(t') == 0`.
#[derive(Clone, Debug)]
pub struct TemplatePlan {
    width: usize,
    height: usize,
    var_t: f32,
    t_prime: Vec<f32>,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    pub fn from_view(tpl: ImageView<'_, u8>) -> DiceMatchResult<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let count = width
            .checked_mul(height)
            .ok_or(DiceMatchError::InvalidDimensions { width, height })?;

        let mut sum = 0.0f64;
        for y in 0..height {
            let row = row_of(tpl, y)?;
            sum += row.iter().map(|&v| f64::from(v)).sum::<f64>();
        }
        let mean = sum / count as f64;

        let mut var_t = 0.0f64;
        let mut t_prime = Vec::with_capacity(count);
        for y in 0..height {
            for &value in row_of(tpl, y)? {
                let centered = f64::from(value) - mean;
                var_t += centered * centered;
                t_prime.push(centered as f32);
            }
        }

        if var_t / count as f64 <= 1e-8 {
            return Err(DiceMatchError::DegenerateTemplate {
                reason: "zero variance",
            });
        }

        Ok(Self {
            width,
            height,
            var_t: var_t as f32,
            t_prime,
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of template pixels.
    pub fn len(&self) -> usize {
        self.t_prime.len()
    }

    /// Returns true for an empty plan (never produced by `from_view`).
    pub fn is_empty(&self) -> bool {
        self.t_prime.is_empty()
    }

    /// Returns `sum((t - mean)^2)`.
    pub fn var_t(&self) -> f32 {
        self.var_t
    }

    /// Returns the zero-mean template buffer in row-major order.
    pub fn t_prime(&self) -> &[f32] {
        &self.t_prime
    }
}

fn row_of<'a>(tpl: ImageView<'a, u8>, y: usize) -> DiceMatchResult<&'a [u8]> {
    tpl.row(y).ok_or(DiceMatchError::BufferTooSmall {
        needed: y * tpl.stride() + tpl.width(),
        got: tpl.as_slice().len(),
    })
}
