//! Low-level building blocks for custom detection pipelines.
//!
//! These items expose ZNCC plans, kernels, resampling and the individual
//! pipeline stages for callers that want to drive scanning or resolution
//! themselves. Most users should prefer `Detector`.

pub use crate::candidate::peak::Peak;
pub use crate::candidate::{resolve, ResolveConfig, ResolveDecision, ResolveStep, Resolution};
pub use crate::image::resize::{resize_area, resize_bilinear, scale_area, scale_bilinear};
pub use crate::kernel::scalar::ZnccScalar;
pub use crate::kernel::{DefaultKernel, Kernel, ScanParams};
pub use crate::search::{
    collect_candidates, scan_posed, scan_template_pose, CandidateSet, LabeledScoreMap,
    PreparedScene, ScoreMap,
};
pub use crate::template::rotate::{rotate_u8_bilinear, rotated_canvas_size};
pub use crate::template::transform::transform_for_pose;
pub use crate::template::TemplatePlan;
pub use crate::util::math::linspace;

#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::scan_full_par;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::ZnccSimd;
