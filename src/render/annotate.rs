//! Annotated result images.
//!
//! Each detection is drawn as its oriented footprint outline with the label
//! shown as die-style pip dots, rotated with the footprint.

use crate::candidate::Detection;
use crate::geometry::Point2;
use crate::image::ImageView;
use crate::util::math::sin_cos_deg;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

/// Colors and stroke widths of the annotations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnnotateStyle {
    pub outline: Rgb<u8>,
    pub pips: Rgb<u8>,
    /// Outline stroke width in pixels.
    pub thickness: u32,
}

impl Default for AnnotateStyle {
    fn default() -> Self {
        Self {
            outline: Rgb([0, 255, 0]),
            pips: Rgb([255, 0, 0]),
            thickness: 4,
        }
    }
}

/// Pip offsets in units of a quarter of the die side, for labels 1..=6.
fn pip_layout(label: u32) -> Vec<(f32, f32)> {
    const C: (f32, f32) = (0.0, 0.0);
    const TL: (f32, f32) = (-1.0, -1.0);
    const TR: (f32, f32) = (1.0, -1.0);
    const BL: (f32, f32) = (-1.0, 1.0);
    const BR: (f32, f32) = (1.0, 1.0);
    const ML: (f32, f32) = (-1.0, 0.0);
    const MR: (f32, f32) = (1.0, 0.0);
    match label {
        1 => vec![C],
        2 => vec![TL, BR],
        3 => vec![TL, C, BR],
        4 => vec![TL, TR, BL, BR],
        5 => vec![TL, TR, C, BL, BR],
        6 => vec![TL, TR, ML, MR, BL, BR],
        // Labels without a die face: a ring of `label` dots.
        n => (0..n)
            .map(|i| {
                let (s, c) = sin_cos_deg(360.0 * i as f32 / n as f32);
                (c, s)
            })
            .collect(),
    }
}

fn to_rgb(scene: ImageView<'_, u8>) -> RgbImage {
    let mut out = RgbImage::new(scene.width() as u32, scene.height() as u32);
    for y in 0..scene.height() {
        if let Some(row) = scene.row(y) {
            for (x, &v) in row.iter().enumerate() {
                out.put_pixel(x as u32, y as u32, Rgb([v, v, v]));
            }
        }
    }
    out
}

fn draw_outline(canvas: &mut RgbImage, corners: &[Point2; 4], style: &AnnotateStyle) {
    let half = style.thickness as f32 * 0.5;
    let steps = style.thickness.max(1);
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let len = (dx * dx + dy * dy).sqrt().max(f32::EPSILON);
        let (nx, ny) = (-dy / len, dx / len);
        for k in 0..steps {
            let off = if steps == 1 { 0.0 } else { k as f32 - half + 0.5 };
            draw_line_segment_mut(
                canvas,
                (a.x + nx * off, a.y + ny * off),
                (b.x + nx * off, b.y + ny * off),
                style.outline,
            );
        }
    }
}

fn draw_detection(canvas: &mut RgbImage, det: &Detection, style: &AnnotateStyle) {
    draw_outline(canvas, &det.footprint().corners(), style);

    let side = det.box_size.width.min(det.box_size.height);
    let spread = side * 0.25;
    let radius = (side * 0.06).round().max(2.0) as i32;
    let (sin_a, cos_a) = sin_cos_deg(det.angle_deg);
    for (u, v) in pip_layout(det.label) {
        let (dx, dy) = (u * spread, v * spread);
        let px = det.center.x + cos_a * dx - sin_a * dy;
        let py = det.center.y + sin_a * dx + cos_a * dy;
        draw_filled_circle_mut(canvas, (px.round() as i32, py.round() as i32), radius, style.pips);
    }
}

/// Draws every detection in place, e.g. onto the color photo that was
/// matched. Detection coordinates must be in the canvas' pixel frame.
pub fn draw_detections_mut(canvas: &mut RgbImage, detections: &[Detection], style: &AnnotateStyle) {
    for det in detections {
        draw_detection(canvas, det, style);
    }
}

/// Draws every detection onto an RGB copy of `scene`.
pub fn annotate_detections(
    scene: ImageView<'_, u8>,
    detections: &[Detection],
    style: &AnnotateStyle,
) -> RgbImage {
    let mut canvas = to_rgb(scene);
    draw_detections_mut(&mut canvas, detections, style);
    canvas
}

/// Returns one snapshot per accepted detection; snapshot `k` shows the first
/// `k + 1` detections.
pub fn annotate_steps(
    scene: ImageView<'_, u8>,
    detections: &[Detection],
    style: &AnnotateStyle,
) -> Vec<RgbImage> {
    let mut canvas = to_rgb(scene);
    detections
        .iter()
        .map(|det| {
            draw_detection(&mut canvas, det, style);
            canvas.clone()
        })
        .collect()
}
