//! Greedy global occupancy resolution.
//!
//! Candidates are visited in descending score order. Each one is accepted when
//! the fraction of its own rasterized footprint that is already occupied stays
//! below `overlap_threshold`; an accepted footprint is OR-ed into the mask.
//! The ratio is taken over the candidate's area, not the union, so a small
//! candidate overlapping a large accepted detection is rejected even when the
//! IoU would be low. Resolution is strictly sequential: every decision depends
//! on all earlier acceptances.

use crate::candidate::{Candidate, Detection, OccupancyMask};
use crate::trace::{trace_debug, trace_event, trace_span};

/// Parameters of the occupancy resolver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolveConfig {
    /// Reject when `overlap / area >= overlap_threshold`.
    pub overlap_threshold: f32,
    /// Stop after this many acceptances.
    pub max_detections: usize,
    /// Keep a `ResolveStep` for every visited candidate.
    pub record_steps: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: 0.2,
            max_detections: 6,
            record_steps: false,
        }
    }
}

/// Outcome for one visited candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveDecision {
    Accepted,
    Rejected,
    /// The footprint covers no pixel of the scene.
    Degenerate,
}

/// Diagnostic record of one resolver step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolveStep {
    pub candidate: Candidate,
    /// `None` for degenerate footprints.
    pub overlap_ratio: Option<f32>,
    pub decision: ResolveDecision,
}

/// Final detections plus the occupancy they claim.
#[derive(Clone, Debug)]
pub struct Resolution {
    /// Accepted candidates in acceptance (descending score) order.
    pub detections: Vec<Detection>,
    /// Union of the accepted footprints.
    pub occupancy: OccupancyMask,
    /// Visited candidates, only filled when `record_steps` is set.
    pub steps: Vec<ResolveStep>,
}

/// Returns candidate indices sorted by descending score.
///
/// Equal scores are ordered by ascending label, then by discovery order
/// (stable sort), so repeated runs over the same input agree exactly.
pub(crate) fn resolution_order(candidates: &[Candidate]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        let (ca, cb) = (&candidates[a], &candidates[b]);
        cb.score
            .total_cmp(&ca.score)
            .then_with(|| ca.label.cmp(&cb.label))
    });
    order
}

/// Resolves `candidates` over a `width x height` scene.
pub fn resolve(
    candidates: &[Candidate],
    width: usize,
    height: usize,
    cfg: &ResolveConfig,
) -> Resolution {
    let _span = trace_span!("resolve", candidates = candidates.len()).entered();

    let mut occupancy = OccupancyMask::new(width, height);
    let mut detections = Vec::new();
    let mut steps = Vec::new();

    if cfg.max_detections > 0 {
        for idx in resolution_order(candidates) {
            let candidate = candidates[idx];
            let spans = candidate.footprint().raster_spans(width, height);
            let area: usize = spans.iter().map(|s| s.len()).sum();
            if area == 0 {
                if cfg.record_steps {
                    steps.push(ResolveStep {
                        candidate,
                        overlap_ratio: None,
                        decision: ResolveDecision::Degenerate,
                    });
                }
                continue;
            }

            let overlap_ratio = occupancy.count_overlap(&spans) as f32 / area as f32;
            let decision = if overlap_ratio < cfg.overlap_threshold {
                occupancy.fill(&spans);
                detections.push(candidate);
                trace_debug!(
                    "accepted",
                    label = candidate.label,
                    score = candidate.score,
                    overlap_ratio = overlap_ratio
                );
                ResolveDecision::Accepted
            } else {
                ResolveDecision::Rejected
            };
            if cfg.record_steps {
                steps.push(ResolveStep {
                    candidate,
                    overlap_ratio: Some(overlap_ratio),
                    decision,
                });
            }
            if detections.len() >= cfg.max_detections {
                break;
            }
        }
    }

    trace_event!("detections", count = detections.len());
    Resolution {
        detections,
        occupancy,
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::{resolution_order, resolve, ResolveConfig, ResolveDecision};
    use crate::candidate::Candidate;
    use crate::geometry::{Point2, Size2};

    fn cand(score: f32, x: f32, y: f32, size: f32, label: u32) -> Candidate {
        Candidate {
            score,
            center: Point2::new(x, y),
            box_size: Size2::new(size, size),
            angle_deg: 0.0,
            label,
        }
    }

    #[test]
    fn ties_break_by_label_then_discovery() {
        let candidates = [
            cand(0.7, 10.0, 10.0, 4.0, 3),
            cand(0.9, 20.0, 10.0, 4.0, 5),
            cand(0.7, 30.0, 10.0, 4.0, 1),
            cand(0.7, 40.0, 10.0, 4.0, 3),
        ];
        assert_eq!(resolution_order(&candidates), vec![1, 2, 0, 3]);
    }

    #[test]
    fn small_candidate_inside_large_detection_is_rejected() {
        let candidates = [
            cand(0.9, 50.0, 50.0, 40.0, 6),
            cand(0.8, 50.0, 50.0, 10.0, 1),
        ];
        let res = resolve(&candidates, 100, 100, &ResolveConfig::default());
        assert_eq!(res.detections.len(), 1);
        assert_eq!(res.detections[0].label, 6);
    }

    #[test]
    fn zero_area_candidates_are_skipped() {
        let candidates = [
            cand(0.95, 50.0, 50.0, 0.0, 2),
            cand(0.9, 50.0, 50.0, 10.0, 4),
        ];
        let cfg = ResolveConfig {
            record_steps: true,
            ..ResolveConfig::default()
        };
        let res = resolve(&candidates, 100, 100, &cfg);
        assert_eq!(res.detections.len(), 1);
        assert_eq!(res.detections[0].label, 4);
        assert_eq!(res.steps[0].decision, ResolveDecision::Degenerate);
        assert_eq!(res.steps[0].overlap_ratio, None);
    }

    #[test]
    fn zero_cap_accepts_nothing() {
        let candidates = [cand(0.9, 50.0, 50.0, 10.0, 1)];
        let cfg = ResolveConfig {
            max_detections: 0,
            ..ResolveConfig::default()
        };
        let res = resolve(&candidates, 100, 100, &cfg);
        assert!(res.detections.is_empty());
        assert!(res.occupancy.is_empty());
    }

    #[test]
    fn overlap_just_below_threshold_is_accepted() {
        // Second box shares 1 of its 10 columns with the first: ratio 0.1.
        let candidates = [
            cand(0.9, 20.0, 20.0, 10.0, 1),
            cand(0.8, 29.0, 20.0, 10.0, 2),
        ];
        let res = resolve(&candidates, 100, 100, &ResolveConfig::default());
        assert_eq!(res.detections.len(), 2);
        assert_eq!(res.occupancy.occupied_count(), 190);
    }
}
