//! Resampling of grayscale `u8` images.
//!
//! Downsampling the scene and the templates uses area averaging: every output
//! pixel is the coverage-weighted mean of the source pixels its footprint
//! overlaps, so an integer reduction (e.g. 5:1) is an exact box filter.
//! Isotropic pose scaling uses bilinear interpolation with half-pixel centers.
//! Both round to the nearest integer and clamp to `[0, 255]`.

use crate::image::{ImageView, OwnedImage};
use crate::util::{DiceMatchError, DiceMatchResult};

/// Returns `round(len * factor)`, never less than one pixel.
pub fn scaled_len(len: usize, factor: f32) -> usize {
    ((len as f64) * f64::from(factor)).round().max(1.0) as usize
}

/// Per-axis source contributions `(index, weight)` for each output sample.
fn area_weights(src_len: usize, dst_len: usize) -> Vec<Vec<(usize, f32)>> {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|d| {
            let s0 = d as f64 * scale;
            let s1 = (d + 1) as f64 * scale;
            let first = s0.floor() as usize;
            let last = (s1.ceil() as usize).min(src_len);
            let mut taps = Vec::with_capacity(last.saturating_sub(first));
            for i in first..last {
                let overlap = s1.min((i + 1) as f64) - s0.max(i as f64);
                if overlap > 1e-9 {
                    taps.push((i, (overlap / scale) as f32));
                }
            }
            taps
        })
        .collect()
}

/// Resizes with area averaging to exactly `dst_width x dst_height`.
pub fn resize_area(
    src: ImageView<'_, u8>,
    dst_width: usize,
    dst_height: usize,
) -> DiceMatchResult<OwnedImage> {
    if dst_width == 0 || dst_height == 0 {
        return Err(DiceMatchError::InvalidDimensions {
            width: dst_width,
            height: dst_height,
        });
    }
    let x_taps = area_weights(src.width(), dst_width);
    let y_taps = area_weights(src.height(), dst_height);

    let mut horizontal = vec![0.0f32; dst_width * src.height()];
    for y in 0..src.height() {
        let row = src.row(y).ok_or(DiceMatchError::BufferTooSmall {
            needed: y * src.stride() + src.width(),
            got: src.as_slice().len(),
        })?;
        let out_row = &mut horizontal[y * dst_width..(y + 1) * dst_width];
        for (out, taps) in out_row.iter_mut().zip(x_taps.iter()) {
            *out = taps.iter().map(|&(i, w)| w * f32::from(row[i])).sum();
        }
    }

    let mut data = vec![0u8; dst_width * dst_height];
    for (dy, taps) in y_taps.iter().enumerate() {
        for dx in 0..dst_width {
            let value: f32 = taps
                .iter()
                .map(|&(sy, w)| w * horizontal[sy * dst_width + dx])
                .sum();
            data[dy * dst_width + dx] = value.round().clamp(0.0, 255.0) as u8;
        }
    }
    OwnedImage::new(data, dst_width, dst_height)
}

/// Scales both axes by `factor` with area averaging.
pub fn scale_area(src: ImageView<'_, u8>, factor: f32) -> DiceMatchResult<OwnedImage> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(DiceMatchError::InvalidConfig {
            reason: "resize factor must be finite and positive",
        });
    }
    resize_area(
        src,
        scaled_len(src.width(), factor),
        scaled_len(src.height(), factor),
    )
}

/// Resizes with bilinear interpolation to exactly `dst_width x dst_height`.
pub fn resize_bilinear(
    src: ImageView<'_, u8>,
    dst_width: usize,
    dst_height: usize,
) -> DiceMatchResult<OwnedImage> {
    if dst_width == 0 || dst_height == 0 {
        return Err(DiceMatchError::InvalidDimensions {
            width: dst_width,
            height: dst_height,
        });
    }
    let sx = src.width() as f32 / dst_width as f32;
    let sy = src.height() as f32 / dst_height as f32;
    let max_x = (src.width() - 1) as f32;
    let max_y = (src.height() - 1) as f32;

    let mut data = vec![0u8; dst_width * dst_height];
    for y in 0..dst_height {
        let fy_src = ((y as f32 + 0.5) * sy - 0.5).clamp(0.0, max_y);
        let y0 = fy_src.floor() as usize;
        let y1 = (y0 + 1).min(src.height() - 1);
        let fy = fy_src - y0 as f32;
        let (Some(row0), Some(row1)) = (src.row(y0), src.row(y1)) else {
            return Err(DiceMatchError::BufferTooSmall {
                needed: y1 * src.stride() + src.width(),
                got: src.as_slice().len(),
            });
        };
        for x in 0..dst_width {
            let fx_src = ((x as f32 + 0.5) * sx - 0.5).clamp(0.0, max_x);
            let x0 = fx_src.floor() as usize;
            let x1 = (x0 + 1).min(src.width() - 1);
            let fx = fx_src - x0 as f32;

            let top = f32::from(row0[x0]) * (1.0 - fx) + f32::from(row0[x1]) * fx;
            let bottom = f32::from(row1[x0]) * (1.0 - fx) + f32::from(row1[x1]) * fx;
            let value = top * (1.0 - fy) + bottom * fy;
            data[y * dst_width + x] = value.round().clamp(0.0, 255.0) as u8;
        }
    }
    OwnedImage::new(data, dst_width, dst_height)
}

/// Scales both axes by `factor` with bilinear interpolation.
pub fn scale_bilinear(src: ImageView<'_, u8>, factor: f32) -> DiceMatchResult<OwnedImage> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(DiceMatchError::InvalidConfig {
            reason: "scale must be finite and positive",
        });
    }
    resize_bilinear(
        src,
        scaled_len(src.width(), factor),
        scaled_len(src.height(), factor),
    )
}
