//! Template rotation onto an enlarged canvas.
//!
//! Angles follow image coordinates (x right, y down): a positive angle turns
//! the content clockwise on screen. Footprint polygons use the same
//! convention, so a detection outline overlays the rotated template exactly.

use crate::image::{ImageView, OwnedImage};
use crate::util::math::sin_cos_deg;

/// Returns the canvas size that holds a `width x height` image rotated by
/// `angle_deg` without clipping.
pub fn rotated_canvas_size(width: usize, height: usize, angle_deg: f32) -> (usize, usize) {
    let (sin_a, cos_a) = sin_cos_deg(angle_deg);
    let (w, h) = (width as f32, height as f32);
    // Tolerance absorbs rounding in sin/cos so axis-aligned angles keep their size.
    let out_w = (w * cos_a.abs() + h * sin_a.abs() - 1e-3).ceil().max(1.0);
    let out_h = (w * sin_a.abs() + h * cos_a.abs() - 1e-3).ceil().max(1.0);
    (out_w as usize, out_h as usize)
}

/// Rotates a grayscale template about its center using bilinear sampling.
///
/// The output canvas is enlarged to the rotated bounding box, and canvas
/// pixels whose inverse-mapped source falls outside the template are set to
/// `fill`. Interior samples are rounded to the nearest integer.
pub fn rotate_u8_bilinear(src: ImageView<'_, u8>, angle_deg: f32, fill: u8) -> OwnedImage {
    let width = src.width();
    let height = src.height();
    let (out_w, out_h) = rotated_canvas_size(width, height, angle_deg);
    let mut out = vec![fill; out_w * out_h];

    let (sin_a, cos_a) = sin_cos_deg(angle_deg);
    let cx = (width as f32 - 1.0) * 0.5;
    let cy = (height as f32 - 1.0) * 0.5;
    let ocx = (out_w as f32 - 1.0) * 0.5;
    let ocy = (out_h as f32 - 1.0) * 0.5;
    let max_x = width as f32 - 1.0;
    let max_y = height as f32 - 1.0;
    let epsilon = 1e-4;

    for y in 0..out_h {
        for x in 0..out_w {
            let dx = x as f32 - ocx;
            let dy = y as f32 - ocy;
            let src_x = cos_a * dx + sin_a * dy + cx;
            let src_y = -sin_a * dx + cos_a * dy + cy;

            if !src_x.is_finite()
                || !src_y.is_finite()
                || src_x < -epsilon
                || src_y < -epsilon
                || src_x > max_x + epsilon
                || src_y > max_y + epsilon
            {
                continue;
            }

            let src_x = src_x.clamp(0.0, max_x);
            let src_y = src_y.clamp(0.0, max_y);
            let x0 = src_x.floor() as usize;
            let y0 = src_y.floor() as usize;
            let x1 = (x0 + 1).min(width - 1);
            let y1 = (y0 + 1).min(height - 1);
            let fx = src_x - x0 as f32;
            let fy = src_y - y0 as f32;

            let (Some(row0), Some(row1)) = (src.row(y0), src.row(y1)) else {
                continue;
            };
            let a = f32::from(row0[x0]);
            let b = f32::from(row0[x1]);
            let c = f32::from(row1[x0]);
            let d = f32::from(row1[x1]);

            let value = a * (1.0 - fx) * (1.0 - fy)
                + b * fx * (1.0 - fy)
                + c * (1.0 - fx) * fy
                + d * fx * fy;
            out[y * out_w + x] = value.round().clamp(0.0, 255.0) as u8;
        }
    }

    OwnedImage::new(out, out_w, out_h).expect("canvas buffer matches its dimensions")
}
