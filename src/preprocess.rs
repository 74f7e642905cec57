//! Scene binarization ahead of matching.
//!
//! Photos of a dice tray are reduced to a white-pips-on-black raster: a
//! circular region of interest is kept, the rest is blacked out, then the
//! image is blurred, thresholded and cleaned with morphology. Available with
//! the `image-io` feature.

use crate::trace::{trace_event, trace_span};
use crate::util::{DiceMatchError, DiceMatchResult};
use image::{DynamicImage, GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{close, dilate, erode};

/// Preprocessing parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreprocessConfig {
    /// ROI center offset from the image center, in pixels.
    pub roi_offset: (i32, i32),
    /// ROI radius as a fraction of the smaller image side.
    pub roi_radius_scale: f32,
    /// Gaussian sigma; zero disables blurring.
    pub blur_sigma: f32,
    /// Pixels strictly above this value become white.
    pub threshold: u8,
    /// Erode-then-dilate radius (Chebyshev), 2 gives a 5x5 square.
    pub open_radius: u8,
    /// Closing radius (Chebyshev), 1 gives a 3x3 square.
    pub close_radius: u8,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            roi_offset: (100, 200),
            roi_radius_scale: 0.55,
            // Sigma of a 15x15 kernel with automatic sigma.
            blur_sigma: 2.6,
            threshold: 200,
            open_radius: 2,
            close_radius: 1,
        }
    }
}

impl PreprocessConfig {
    fn validate(&self) -> DiceMatchResult<()> {
        if !self.roi_radius_scale.is_finite() || self.roi_radius_scale < 0.0 {
            return Err(DiceMatchError::InvalidConfig {
                reason: "roi_radius_scale must be finite and non-negative",
            });
        }
        if !self.blur_sigma.is_finite() || self.blur_sigma < 0.0 {
            return Err(DiceMatchError::InvalidConfig {
                reason: "blur_sigma must be finite and non-negative",
            });
        }
        Ok(())
    }
}

/// Blacks out everything outside the circular region of interest.
pub fn apply_circular_roi(img: &mut GrayImage, cfg: &PreprocessConfig) {
    let (w, h) = (i64::from(img.width()), i64::from(img.height()));
    let cx = w / 2 + i64::from(cfg.roi_offset.0);
    let cy = h / 2 + i64::from(cfg.roi_offset.1);
    let radius = (w.min(h) as f32 * cfg.roi_radius_scale) as i64;
    let r2 = radius * radius;
    for (x, y, px) in img.enumerate_pixels_mut() {
        let dx = i64::from(x) - cx;
        let dy = i64::from(y) - cy;
        if dx * dx + dy * dy > r2 {
            *px = Luma([0]);
        }
    }
}

/// Binary threshold: values above `threshold` map to 255, the rest to 0.
pub fn binarize(img: &mut GrayImage, threshold: u8) {
    for px in img.pixels_mut() {
        px.0[0] = if px.0[0] > threshold { 255 } else { 0 };
    }
}

/// Runs the full chain on a grayscale image.
pub fn preprocess_gray(gray: &GrayImage, cfg: &PreprocessConfig) -> DiceMatchResult<GrayImage> {
    cfg.validate()?;
    let _span = trace_span!("preprocess", width = gray.width(), height = gray.height()).entered();

    let mut img = gray.clone();
    apply_circular_roi(&mut img, cfg);
    let mut img = if cfg.blur_sigma > 0.0 {
        gaussian_blur_f32(&img, cfg.blur_sigma)
    } else {
        img
    };
    binarize(&mut img, cfg.threshold);
    if cfg.open_radius > 0 {
        img = erode(&img, Norm::LInf, cfg.open_radius);
        img = dilate(&img, Norm::LInf, cfg.open_radius);
    }
    if cfg.close_radius > 0 {
        img = close(&img, Norm::LInf, cfg.close_radius);
    }

    let white = img.pixels().filter(|px| px.0[0] > 0).count();
    trace_event!("preprocessed", white_pixels = white);
    Ok(img)
}

/// Converts any decoded image to luma and runs the full chain.
pub fn preprocess_image(img: &DynamicImage, cfg: &PreprocessConfig) -> DiceMatchResult<GrayImage> {
    preprocess_gray(&img.to_luma8(), cfg)
}
