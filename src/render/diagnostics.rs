//! Diagnostic rasters: score heatmaps, candidate cloud, occupancy mask.
//!
//! None of these feed back into detection.

use crate::candidate::{Candidate, OccupancyMask};
use crate::image::ImageView;
use crate::search::ScoreMap;
use image::{GrayImage, Luma, Rgb, RgbImage};

/// Intensity added per candidate covering a pixel in the cloud.
pub const CLOUD_STEP: u16 = 20;

/// Min-max normalizes a score map to `0..=255`. A constant map becomes black.
pub fn heatmap_to_gray(map: &ScoreMap) -> GrayImage {
    let data = map.data();
    let lo = data.iter().copied().fold(f32::INFINITY, f32::min);
    let hi = data.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = hi - lo;
    let mut out = GrayImage::new(map.width() as u32, map.height() as u32);
    if !range.is_finite() || range <= 0.0 {
        return out;
    }
    for (px, &v) in out.pixels_mut().zip(data) {
        *px = Luma([((v - lo) / range * 255.0).round().clamp(0.0, 255.0) as u8]);
    }
    out
}

/// Jet colormap lookup for a normalized intensity.
fn jet(v: u8) -> Rgb<u8> {
    let t = f32::from(v) / 255.0;
    let channel = |offset: f32| ((1.5 - (4.0 * t - offset).abs()).clamp(0.0, 1.0) * 255.0) as u8;
    Rgb([channel(3.0), channel(2.0), channel(1.0)])
}

/// Normalized heatmap rendered with a jet colormap.
pub fn heatmap_to_color(map: &ScoreMap) -> RgbImage {
    let gray = heatmap_to_gray(map);
    let mut out = RgbImage::new(gray.width(), gray.height());
    for (dst, src) in out.pixels_mut().zip(gray.pixels()) {
        *dst = jet(src[0]);
    }
    out
}

/// Accumulates every candidate footprint with `CLOUD_STEP` per hit and
/// blends the result over the dimmed scene.
pub fn candidate_cloud(scene: ImageView<'_, u8>, candidates: &[Candidate]) -> RgbImage {
    let (w, h) = (scene.width(), scene.height());
    let mut acc = vec![0u16; w * h];
    for cand in candidates {
        for span in cand.footprint().raster_spans(w, h) {
            for cell in &mut acc[span.y * w + span.x0..span.y * w + span.x1] {
                *cell = cell.saturating_add(CLOUD_STEP);
            }
        }
    }

    let mut out = RgbImage::new(w as u32, h as u32);
    for y in 0..h {
        let Some(row) = scene.row(y) else {
            continue;
        };
        for (x, &v) in row.iter().enumerate() {
            let base = f32::from(v) * 0.6;
            let heat = f32::from(acc[y * w + x].min(255));
            let blend = |add: f32| (base + add).round().min(255.0) as u8;
            out.put_pixel(x as u32, y as u32, Rgb([blend(0.0), blend(heat), blend(heat)]));
        }
    }
    out
}

/// Occupancy mask as a 0/255 grayscale image.
pub fn occupancy_to_gray(mask: &OccupancyMask) -> GrayImage {
    GrayImage::from_fn(mask.width() as u32, mask.height() as u32, |x, y| {
        Luma([if mask.is_occupied(x as usize, y as usize) {
            255
        } else {
            0
        }])
    })
}
