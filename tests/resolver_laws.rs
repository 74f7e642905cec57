use dicematch::lowlevel::{resolve, ResolveConfig, ResolveDecision};
use dicematch::{Candidate, OccupancyMask, Point2, Size2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const W: usize = 200;
const H: usize = 150;

fn cand(score: f32, x: f32, y: f32, w: f32, h: f32, angle_deg: f32, label: u32) -> Candidate {
    Candidate {
        score,
        center: Point2::new(x, y),
        box_size: Size2::new(w, h),
        angle_deg,
        label,
    }
}

fn random_candidates(rng: &mut StdRng, count: usize) -> Vec<Candidate> {
    (0..count)
        .map(|_| {
            let side = rng.random_range(8.0..40.0);
            cand(
                rng.random_range(0.6..1.0),
                rng.random_range(0.0..W as f32),
                rng.random_range(0.0..H as f32),
                side,
                side * rng.random_range(0.8..1.2),
                rng.random_range(-90.0..90.0),
                rng.random_range(1..=6),
            )
        })
        .collect()
}

fn footprint_mask(cands: &[Candidate]) -> OccupancyMask {
    let mut mask = OccupancyMask::new(W, H);
    for c in cands {
        mask.fill(&c.footprint().raster_spans(W, H));
    }
    mask
}

#[test]
fn resolving_detections_again_is_identity() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        let candidates = random_candidates(&mut rng, 60);
        let cfg = ResolveConfig::default();
        let first = resolve(&candidates, W, H, &cfg);
        let second = resolve(&first.detections, W, H, &cfg);
        assert_eq!(first.detections, second.detections);
        assert_eq!(first.occupancy, second.occupancy);
    }
}

#[test]
fn occupancy_equals_union_of_accepted_footprints_and_only_grows() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let candidates = random_candidates(&mut rng, 40);
        let cfg = ResolveConfig {
            max_detections: usize::MAX,
            ..ResolveConfig::default()
        };
        let res = resolve(&candidates, W, H, &cfg);
        assert_eq!(res.occupancy, footprint_mask(&res.detections));

        let mut previous = 0;
        for k in 1..=res.detections.len() {
            let count = footprint_mask(&res.detections[..k]).occupied_count();
            assert!(count >= previous);
            previous = count;
        }
    }
}

#[test]
fn every_acceptance_obeys_the_overlap_law() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..20 {
        let candidates = random_candidates(&mut rng, 50);
        let cfg = ResolveConfig {
            max_detections: usize::MAX,
            record_steps: true,
            ..ResolveConfig::default()
        };
        let res = resolve(&candidates, W, H, &cfg);

        let mut mask = OccupancyMask::new(W, H);
        for step in &res.steps {
            let spans = step.candidate.footprint().raster_spans(W, H);
            let area: usize = spans.iter().map(|s| s.len()).sum();
            match step.decision {
                ResolveDecision::Degenerate => assert_eq!(area, 0),
                ResolveDecision::Accepted => {
                    let ratio = mask.count_overlap(&spans) as f32 / area as f32;
                    assert!(ratio < cfg.overlap_threshold);
                    assert_eq!(step.overlap_ratio, Some(ratio));
                    mask.fill(&spans);
                }
                ResolveDecision::Rejected => {
                    let ratio = mask.count_overlap(&spans) as f32 / area as f32;
                    assert!(ratio >= cfg.overlap_threshold);
                }
            }
        }
        assert_eq!(mask, res.occupancy);

        let scores: Vec<f32> = res.steps.iter().map(|s| s.candidate.score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }
}

#[test]
fn cap_limits_detections_and_keeps_highest_scores() {
    // Seven disjoint boxes with distinct scores.
    let candidates: Vec<Candidate> = (0..7)
        .map(|i| {
            cand(
                0.3 + 0.1 * i as f32,
                15.0 + 25.0 * i as f32,
                50.0,
                20.0,
                20.0,
                0.0,
                1 + (i % 6) as u32,
            )
        })
        .collect();
    let res = resolve(&candidates, W, H, &ResolveConfig::default());
    assert_eq!(res.detections.len(), 6);
    assert!(res.detections.iter().all(|d| d.score > 0.35));
    let scores: Vec<f32> = res.detections.iter().map(|d| d.score).collect();
    assert!(scores.windows(2).all(|w| w[0] > w[1]));

    for cap in 0..8 {
        let cfg = ResolveConfig {
            max_detections: cap,
            ..ResolveConfig::default()
        };
        assert_eq!(resolve(&candidates, W, H, &cfg).detections.len(), cap.min(7));
    }
}

#[test]
fn heavily_overlapping_pair_keeps_the_stronger() {
    let candidates = [
        cand(0.7, 52.0, 50.0, 30.0, 30.0, 0.0, 2),
        cand(0.9, 50.0, 50.0, 30.0, 30.0, 10.0, 5),
    ];
    let res = resolve(&candidates, W, H, &ResolveConfig::default());
    assert_eq!(res.detections.len(), 1);
    assert_eq!(res.detections[0].score, 0.9);
    assert_eq!(res.detections[0].label, 5);
}

#[test]
fn overlap_ratio_uses_the_candidate_area() {
    // The small box lies fully inside the accepted big one: IoU is 1/16 but
    // the ratio over its own area is 1, so it is rejected.
    let candidates = [
        cand(0.9, 100.0, 75.0, 80.0, 80.0, 0.0, 6),
        cand(0.85, 100.0, 75.0, 20.0, 20.0, 0.0, 1),
        cand(0.8, 170.0, 75.0, 20.0, 20.0, 0.0, 1),
    ];
    let res = resolve(&candidates, W, H, &ResolveConfig::default());
    let labels: Vec<u32> = res.detections.iter().map(|d| d.label).collect();
    assert_eq!(labels, vec![6, 1]);
    assert_eq!(res.detections[1].center.x, 170.0);
}

#[test]
fn footprints_are_clipped_to_the_scene() {
    let candidates = [
        cand(0.9, 0.0, 0.0, 20.0, 20.0, 0.0, 1),
        cand(0.8, -50.0, -50.0, 20.0, 20.0, 0.0, 2),
    ];
    let cfg = ResolveConfig {
        record_steps: true,
        ..ResolveConfig::default()
    };
    let res = resolve(&candidates, W, H, &cfg);
    assert_eq!(res.detections.len(), 1);
    assert_eq!(res.occupancy.occupied_count(), 100);
    assert_eq!(res.steps[1].decision, ResolveDecision::Degenerate);
}

#[test]
fn empty_input_gives_empty_resolution() {
    let res = resolve(&[], W, H, &ResolveConfig::default());
    assert!(res.detections.is_empty());
    assert!(res.occupancy.is_empty());
    assert!(res.steps.is_empty());
}
