//! Detection pipeline: scan, aggregate, resolve.
//!
//! `Detector` compiles a template library once and runs the full pipeline on
//! any number of scenes. All parameters travel in an explicit `DetectConfig`,
//! so detectors with different settings can coexist.

pub mod aggregate;
mod heatmap;
pub mod scan;

pub use aggregate::{collect_candidates, CandidateSet};
pub use heatmap::{LabeledScoreMap, ScoreMap};
pub use scan::{scan_posed, scan_template_pose, PreparedScene};

use crate::bank::{CompiledTemplate, PoseGrid, TemplateLibrary};
use crate::candidate::{resolve, Candidate, Detection, OccupancyMask, ResolveConfig, ResolveStep};
use crate::image::ImageView;
use crate::render::LabelCounts;
use crate::trace::trace_span;
use crate::util::{DiceMatchError, DiceMatchResult};
use std::sync::atomic::AtomicBool;

/// Optional side channels. None of them changes the detections.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiagnosticsConfig {
    /// Keep a best-score map per template.
    pub heatmaps: bool,
    /// Keep every raw candidate in the report.
    pub candidates: bool,
    /// Keep a record of every resolver step.
    pub steps: bool,
}

/// Detection parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectConfig {
    /// Scene and template downsampling factor before correlation.
    pub resize_factor: f32,
    /// Scale x rotation hypotheses tested for every template.
    pub poses: PoseGrid,
    /// Inclusive minimum ZNCC score of a candidate.
    pub score_threshold: f32,
    /// Maximum fraction of a candidate's footprint that may already be occupied.
    pub overlap_threshold: f32,
    /// Upper bound on accepted detections.
    pub max_detections: usize,
    /// Largest label reported in the counts (labels 1..=max_label).
    pub max_label: u32,
    /// Background value for pixels uncovered by template rotation.
    pub fill_value: u8,
    /// Minimum per-pixel variance of a scene window to be scored.
    pub min_var_i: f32,
    /// Scan templates, poses and rows in parallel (requires `rayon`).
    pub parallel: bool,
    pub diagnostics: DiagnosticsConfig,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            resize_factor: 0.2,
            poses: PoseGrid::default(),
            score_threshold: 0.60,
            overlap_threshold: 0.2,
            max_detections: 6,
            max_label: 6,
            fill_value: 0,
            min_var_i: 1.0,
            parallel: false,
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

impl DetectConfig {
    /// Checks value domains. Empty pose axes are allowed (they yield no
    /// candidates and are reported as a warning during the sweep).
    pub fn validate(&self) -> DiceMatchResult<()> {
        if !self.resize_factor.is_finite() || self.resize_factor <= 0.0 {
            return Err(DiceMatchError::InvalidConfig {
                reason: "resize_factor must be finite and positive",
            });
        }
        if self
            .poses
            .scales()
            .iter()
            .any(|s| !s.is_finite() || *s <= 0.0)
        {
            return Err(DiceMatchError::InvalidConfig {
                reason: "scales must be finite and positive",
            });
        }
        if self.poses.rotations_deg().iter().any(|a| !a.is_finite()) {
            return Err(DiceMatchError::InvalidConfig {
                reason: "rotations must be finite",
            });
        }
        if self.score_threshold.is_nan() || self.overlap_threshold.is_nan() {
            return Err(DiceMatchError::InvalidConfig {
                reason: "thresholds must not be NaN",
            });
        }
        if !self.min_var_i.is_finite() || self.min_var_i < 0.0 {
            return Err(DiceMatchError::InvalidConfig {
                reason: "min_var_i must be finite and non-negative",
            });
        }
        Ok(())
    }

    fn resolve_config(&self) -> ResolveConfig {
        ResolveConfig {
            overlap_threshold: self.overlap_threshold,
            max_detections: self.max_detections,
            record_steps: self.diagnostics.steps,
        }
    }
}

/// Result of one detection run.
#[derive(Clone, Debug)]
pub struct DetectionReport {
    /// Accepted detections in acceptance order.
    pub detections: Vec<Detection>,
    /// Detections per label, covering 1..=max_label.
    pub counts: LabelCounts,
    /// Union of accepted footprints at full resolution.
    pub occupancy: OccupancyMask,
    /// Number of raw candidates fed to the resolver.
    pub candidate_count: usize,
    /// Raw candidates (when `diagnostics.candidates` is set).
    pub candidates: Vec<Candidate>,
    /// Per-template best-score maps (when `diagnostics.heatmaps` is set).
    pub heatmaps: Vec<LabeledScoreMap>,
    /// Resolver steps (when `diagnostics.steps` is set).
    pub steps: Vec<ResolveStep>,
    /// Factor between full and heatmap resolution.
    pub resize_factor: f32,
}

/// Compiled template library plus configuration.
pub struct Detector {
    templates: Vec<CompiledTemplate>,
    cfg: DetectConfig,
}

impl Detector {
    /// Validates `cfg` and compiles every template of `library`.
    ///
    /// An empty library is rejected here, before any scene is scanned.
    pub fn new(library: &TemplateLibrary, cfg: DetectConfig) -> DiceMatchResult<Self> {
        cfg.validate()?;
        if library.is_empty() {
            return Err(DiceMatchError::EmptyTemplateLibrary);
        }
        let templates = library
            .iter()
            .map(|tpl| CompiledTemplate::compile(tpl, cfg.resize_factor, &cfg.poses, cfg.fill_value))
            .collect::<DiceMatchResult<Vec<_>>>()?;
        Ok(Self { templates, cfg })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &DetectConfig {
        &self.cfg
    }

    /// Returns the compiled templates in scan order.
    pub fn templates(&self) -> &[CompiledTemplate] {
        &self.templates
    }

    /// Detects dice in a preprocessed grayscale scene.
    pub fn detect(&self, scene: ImageView<'_, u8>) -> DiceMatchResult<DetectionReport> {
        self.run(scene, None)
    }

    /// Like `detect`, but gives up with `Cancelled` once `cancel` is set.
    /// The flag is polled between pose iterations.
    pub fn detect_cancellable(
        &self,
        scene: ImageView<'_, u8>,
        cancel: &AtomicBool,
    ) -> DiceMatchResult<DetectionReport> {
        self.run(scene, Some(cancel))
    }

    fn run(
        &self,
        scene: ImageView<'_, u8>,
        cancel: Option<&AtomicBool>,
    ) -> DiceMatchResult<DetectionReport> {
        let _span = trace_span!("detect", width = scene.width(), height = scene.height()).entered();

        let prepared = PreparedScene::new(scene, self.cfg.resize_factor)?;
        let set = collect_candidates(&prepared, &self.templates, &self.cfg, cancel)?;
        let resolution = resolve(
            &set.candidates,
            scene.width(),
            scene.height(),
            &self.cfg.resolve_config(),
        );
        let counts = LabelCounts::from_detections(&resolution.detections, self.cfg.max_label);

        Ok(DetectionReport {
            counts,
            candidate_count: set.candidates.len(),
            candidates: if self.cfg.diagnostics.candidates {
                set.candidates
            } else {
                Vec::new()
            },
            detections: resolution.detections,
            occupancy: resolution.occupancy,
            heatmaps: set.heatmaps,
            steps: resolution.steps,
            resize_factor: self.cfg.resize_factor,
        })
    }
}
