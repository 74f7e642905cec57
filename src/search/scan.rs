//! Correlation scanner: one template at one pose against the scene.

use crate::bank::{CompiledTemplate, Pose, PoseGrid, PosedTemplate};
use crate::candidate::peak::Peak;
use crate::candidate::Candidate;
use crate::geometry::{Point2, Size2};
use crate::image::resize::scale_area;
use crate::image::{ImageView, OwnedImage};
use crate::kernel::{DefaultKernel, Kernel, ScanParams};
use crate::search::{DetectConfig, ScoreMap};
use crate::template::Template;
use crate::util::{DiceMatchError, DiceMatchResult};

/// Scene downsampled once per run to the scan resolution.
#[derive(Clone, Debug)]
pub struct PreparedScene {
    small: OwnedImage,
    full_width: usize,
    full_height: usize,
    resize_factor: f32,
}

impl PreparedScene {
    /// Downsamples `scene` by `resize_factor` with area averaging.
    pub fn new(scene: ImageView<'_, u8>, resize_factor: f32) -> DiceMatchResult<Self> {
        let small = if resize_factor == 1.0 {
            OwnedImage::from_view(scene)?
        } else {
            scale_area(scene, resize_factor)?
        };
        Ok(Self {
            small,
            full_width: scene.width(),
            full_height: scene.height(),
            resize_factor,
        })
    }

    /// Returns the scene at scan resolution.
    pub fn small(&self) -> &OwnedImage {
        &self.small
    }

    /// Returns the factor between full and scan resolution.
    pub fn resize_factor(&self) -> f32 {
        self.resize_factor
    }

    /// Creates an empty best-score map at scan resolution.
    pub fn score_map(&self) -> ScoreMap {
        ScoreMap::new(self.small.width(), self.small.height())
    }

    /// Maps a window placed at `peak` with `window` scan-resolution size to a
    /// candidate in full-resolution coordinates.
    fn candidate_from_peak(
        &self,
        peak: Peak,
        window: (usize, usize),
        box_size: Size2,
        angle_deg: f32,
        label: u32,
    ) -> Candidate {
        let full_w = self.full_width as f32;
        let full_h = self.full_height as f32;
        let cx = (peak.x as f32 + window.0 as f32 * 0.5) / self.resize_factor;
        let cy = (peak.y as f32 + window.1 as f32 * 0.5) / self.resize_factor;
        Candidate {
            score: peak.score,
            center: Point2::new(cx.clamp(0.0, full_w), cy.clamp(0.0, full_h)),
            box_size: Size2::new(box_size.width.min(full_w), box_size.height.min(full_h)),
            angle_deg,
            label,
        }
    }
}

pub(crate) fn scan_params(cfg: &DetectConfig) -> ScanParams {
    ScanParams {
        min_var_i: cfg.min_var_i,
        min_score: cfg.score_threshold,
    }
}

/// Scans one posed template and returns every placement scoring at least
/// `cfg.score_threshold`, in row-major order.
///
/// When `surface` is given, every defined score is folded into it.
pub fn scan_posed(
    scene: &PreparedScene,
    posed: &PosedTemplate,
    label: u32,
    cfg: &DetectConfig,
    surface: Option<&mut ScoreMap>,
) -> Vec<Candidate> {
    let params = scan_params(cfg);
    let image = scene.small.view();
    #[cfg(feature = "rayon")]
    let peaks = if cfg.parallel {
        crate::kernel::rayon::scan_full_par::<DefaultKernel>(image, posed.plan(), params, surface)
    } else {
        DefaultKernel::scan_full(image, posed.plan(), params, surface)
    };
    #[cfg(not(feature = "rayon"))]
    let peaks = DefaultKernel::scan_full(image, posed.plan(), params, surface);

    let window = (posed.image().width(), posed.image().height());
    let pose = posed.pose();
    peaks
        .into_iter()
        .map(|peak| scene.candidate_from_peak(peak, window, posed.box_size(), pose.angle_deg, label))
        .collect()
}

/// Scans `template` at a single `pose`.
///
/// Convenience entry for one-off scans; `Detector` compiles templates once
/// and reuses their posed variants instead.
pub fn scan_template_pose(
    scene: &PreparedScene,
    template: &Template,
    pose: Pose,
    cfg: &DetectConfig,
    surface: Option<&mut ScoreMap>,
) -> DiceMatchResult<Vec<Candidate>> {
    if (scene.resize_factor - cfg.resize_factor).abs() > f32::EPSILON {
        return Err(DiceMatchError::InvalidConfig {
            reason: "scene was prepared with a different resize factor",
        });
    }
    let grid = PoseGrid::new(vec![pose.scale], vec![pose.angle_deg]);
    let compiled = CompiledTemplate::compile(template, cfg.resize_factor, &grid, cfg.fill_value)?;
    Ok(match compiled.posed(0)? {
        Some(posed) => scan_posed(scene, posed, template.label(), cfg, surface),
        None => Vec::new(),
    })
}
