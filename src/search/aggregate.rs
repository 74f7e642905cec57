//! Candidate aggregation over every template and pose.
//!
//! Output order is deterministic in both sequential and parallel sweeps:
//! template order, then pose order (scale-major), then row-major placement.
//! Parallel jobs fill local buffers that are concatenated in that order.

use crate::bank::CompiledTemplate;
use crate::candidate::Candidate;
use crate::search::heatmap::LabeledScoreMap;
use crate::search::scan::{scan_posed, PreparedScene};
use crate::search::{DetectConfig, ScoreMap};
use crate::trace::{trace_debug, trace_event, trace_span, trace_warn};
use crate::util::{DiceMatchError, DiceMatchResult};
use std::sync::atomic::{AtomicBool, Ordering};

/// Everything the sweep produced before resolution.
#[derive(Clone, Debug, Default)]
pub struct CandidateSet {
    /// All above-threshold candidates, in discovery order.
    pub candidates: Vec<Candidate>,
    /// Per-template best-score maps (only when heatmaps are enabled).
    pub heatmaps: Vec<LabeledScoreMap>,
}

/// Position of one (template, pose) job within the whole sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SweepProgress {
    poses_per_template: usize,
    total: usize,
}

impl SweepProgress {
    fn new(templates: usize, poses_per_template: usize) -> Self {
        Self {
            poses_per_template,
            total: templates * poses_per_template,
        }
    }

    /// 1-based step number of the job, as reported in progress events.
    fn step(&self, template_idx: usize, pose_idx: usize) -> usize {
        template_idx * self.poses_per_template + pose_idx + 1
    }

    fn report(&self, template_idx: usize, pose_idx: usize) {
        let step = self.step(template_idx, pose_idx);
        trace_debug!(
            "sweep_progress",
            template_idx = template_idx,
            pose_idx = pose_idx,
            step = step,
            total = self.total
        );
    }
}

fn check_cancel(cancel: Option<&AtomicBool>) -> DiceMatchResult<()> {
    match cancel {
        Some(flag) if flag.load(Ordering::Relaxed) => Err(DiceMatchError::Cancelled),
        _ => Ok(()),
    }
}

/// Scans all poses of one template in grid order.
fn scan_template(
    scene: &PreparedScene,
    template_idx: usize,
    compiled: &CompiledTemplate,
    progress: SweepProgress,
    cfg: &DetectConfig,
    cancel: Option<&AtomicBool>,
    mut heatmap: Option<&mut ScoreMap>,
) -> DiceMatchResult<Vec<Candidate>> {
    let _span = trace_span!("scan_template", label = compiled.label()).entered();
    let mut out = Vec::new();
    for pose_idx in 0..compiled.grid().len() {
        check_cancel(cancel)?;
        progress.report(template_idx, pose_idx);
        if let Some(posed) = compiled.posed(pose_idx)? {
            out.extend(scan_posed(
                scene,
                posed,
                compiled.label(),
                cfg,
                heatmap.as_deref_mut(),
            ));
        }
    }
    trace_event!("template_candidates", label = compiled.label(), count = out.len());
    Ok(out)
}

/// Runs the full template x pose sweep.
///
/// Fails with `EmptyTemplateLibrary` before scanning anything when there
/// are no templates, and with `Cancelled` when `cancel` is raised between
/// pose iterations; partial results are dropped in that case.
pub fn collect_candidates(
    scene: &PreparedScene,
    templates: &[CompiledTemplate],
    cfg: &DetectConfig,
    cancel: Option<&AtomicBool>,
) -> DiceMatchResult<CandidateSet> {
    if templates.is_empty() {
        return Err(DiceMatchError::EmptyTemplateLibrary);
    }
    let _span = trace_span!(
        "collect_candidates",
        templates = templates.len(),
        poses = cfg.poses.len()
    )
    .entered();
    if cfg.poses.is_empty() {
        trace_warn!(
            "empty_pose_grid",
            scales = cfg.poses.scales().len(),
            rotations = cfg.poses.rotations_deg().len()
        );
    }

    #[cfg(feature = "rayon")]
    let set = if cfg.parallel {
        collect_par(scene, templates, cfg, cancel)?
    } else {
        collect_seq(scene, templates, cfg, cancel)?
    };
    #[cfg(not(feature = "rayon"))]
    let set = collect_seq(scene, templates, cfg, cancel)?;

    trace_event!("candidates", count = set.candidates.len());
    Ok(set)
}

fn collect_seq(
    scene: &PreparedScene,
    templates: &[CompiledTemplate],
    cfg: &DetectConfig,
    cancel: Option<&AtomicBool>,
) -> DiceMatchResult<CandidateSet> {
    let progress = SweepProgress::new(templates.len(), cfg.poses.len());
    let mut set = CandidateSet::default();
    for (t, compiled) in templates.iter().enumerate() {
        let mut heatmap = cfg.diagnostics.heatmaps.then(|| scene.score_map());
        let found = scan_template(scene, t, compiled, progress, cfg, cancel, heatmap.as_mut())?;
        set.candidates.extend(found);
        if let Some(map) = heatmap {
            set.heatmaps.push(LabeledScoreMap {
                label: compiled.label(),
                map,
            });
        }
    }
    Ok(set)
}

#[cfg(feature = "rayon")]
fn collect_par(
    scene: &PreparedScene,
    templates: &[CompiledTemplate],
    cfg: &DetectConfig,
    cancel: Option<&AtomicBool>,
) -> DiceMatchResult<CandidateSet> {
    use rayon::prelude::*;

    let progress = SweepProgress::new(templates.len(), cfg.poses.len());
    if cfg.diagnostics.heatmaps {
        // A heatmap is folded pose by pose, so poses of one template stay sequential.
        let per_template: Vec<(Vec<Candidate>, LabeledScoreMap)> = templates
            .par_iter()
            .enumerate()
            .map(|(t, compiled)| {
                let mut map = scene.score_map();
                let found =
                    scan_template(scene, t, compiled, progress, cfg, cancel, Some(&mut map))?;
                Ok((
                    found,
                    LabeledScoreMap {
                        label: compiled.label(),
                        map,
                    },
                ))
            })
            .collect::<DiceMatchResult<_>>()?;
        let mut set = CandidateSet::default();
        for (found, heatmap) in per_template {
            set.candidates.extend(found);
            set.heatmaps.push(heatmap);
        }
        return Ok(set);
    }

    let jobs: Vec<(usize, usize)> = templates
        .iter()
        .enumerate()
        .flat_map(|(t, compiled)| (0..compiled.grid().len()).map(move |p| (t, p)))
        .collect();
    let per_job: Vec<Vec<Candidate>> = jobs
        .par_iter()
        .map(|&(t, p)| {
            check_cancel(cancel)?;
            progress.report(t, p);
            let compiled = &templates[t];
            Ok(match compiled.posed(p)? {
                Some(posed) => scan_posed(scene, posed, compiled.label(), cfg, None),
                None => Vec::new(),
            })
        })
        .collect::<DiceMatchResult<_>>()?;
    Ok(CandidateSet {
        candidates: per_job.into_iter().flatten().collect(),
        heatmaps: Vec::new(),
    })
}
