//! DiceMatch detects dice top faces in a binarized photo and counts pips.
//!
//! Every reference template (one per pip count) is swept over a downsampled
//! scene at a grid of scales and rotations using ZNCC. All above-threshold
//! placements become candidates, which a greedy global occupancy resolver
//! turns into a non-overlapping set of detections and per-label counts.
//!
//! The core works on plain `u8` rasters and has no required dependencies
//! beyond `thiserror`. Optional features:
//! - `rayon`: parallel template, pose and row sweeps;
//! - `simd`: `wide`-based ZNCC kernel;
//! - `image-io`: image loading, scene preprocessing and annotated output;
//! - `tracing`: spans and events for each pipeline stage.
//!
//! ```
//! use dicematch::{DetectConfig, Detector, ImageView, Template, TemplateLibrary};
//!
//! let mut tpl = vec![0u8; 10 * 10];
//! for y in 3..7 {
//!     for x in 2..5 {
//!         tpl[y * 10 + x] = 255;
//!     }
//! }
//! let mut scene = vec![0u8; 40 * 30];
//! for y in 0..10 {
//!     scene[(10 + y) * 40 + 15..(10 + y) * 40 + 25].copy_from_slice(&tpl[y * 10..y * 10 + 10]);
//! }
//!
//! let library = TemplateLibrary::new(vec![Template::new(tpl, 10, 10, 1)?]);
//! let cfg = DetectConfig {
//!     resize_factor: 1.0,
//!     poses: dicematch::PoseGrid::new(vec![1.0], vec![0.0]),
//!     ..DetectConfig::default()
//! };
//! let detector = Detector::new(&library, cfg)?;
//! let report = detector.detect(ImageView::from_slice(&scene, 40, 30)?)?;
//! assert_eq!(report.counts.get(1), 1);
//! # Ok::<(), dicematch::DiceMatchError>(())
//! ```

pub mod bank;
pub mod candidate;
pub mod geometry;
pub mod image;
pub mod kernel;
pub mod lowlevel;
#[cfg(feature = "image-io")]
pub mod preprocess;
pub mod render;
pub mod search;
pub mod template;
mod trace;
pub mod util;

pub use bank::{CompiledTemplate, Pose, PoseGrid, TemplateLibrary};
pub use candidate::{Candidate, Detection, OccupancyMask};
pub use geometry::{OrientedRect, Point2, Size2};
pub use image::{ImageView, OwnedImage};
pub use render::LabelCounts;
pub use search::{DetectConfig, DetectionReport, Detector, DiagnosticsConfig};
pub use template::Template;
pub use util::{DiceMatchError, DiceMatchResult};
