use dicematch::lowlevel::collect_candidates;
use dicematch::{
    DetectConfig, Detector, DiagnosticsConfig, DiceMatchError, ImageView, PoseGrid, Template,
    TemplateLibrary,
};
use std::sync::atomic::AtomicBool;

const FACE: usize = 60;

/// White pips on black, laid out like a die face.
fn die_face(pips: u32) -> Vec<u8> {
    let q = FACE as f32 / 4.0;
    let c = FACE as f32 / 2.0;
    let spots: &[(f32, f32)] = match pips {
        1 => &[(0.0, 0.0)],
        2 => &[(-1.0, -1.0), (1.0, 1.0)],
        3 => &[(-1.0, -1.0), (0.0, 0.0), (1.0, 1.0)],
        4 => &[(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)],
        5 => &[(-1.0, -1.0), (1.0, -1.0), (0.0, 0.0), (-1.0, 1.0), (1.0, 1.0)],
        _ => &[(-1.0, -1.0), (1.0, -1.0), (-1.0, 0.0), (1.0, 0.0), (-1.0, 1.0), (1.0, 1.0)],
    };
    let mut data = vec![0u8; FACE * FACE];
    for y in 0..FACE {
        for x in 0..FACE {
            let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
            if spots
                .iter()
                .any(|&(u, v)| (px - c - u * q).powi(2) + (py - c - v * q).powi(2) <= 36.0)
            {
                data[y * FACE + x] = 255;
            }
        }
    }
    data
}

fn library(labels: &[u32]) -> TemplateLibrary {
    TemplateLibrary::new(
        labels
            .iter()
            .map(|&pips| Template::new(die_face(pips), FACE, FACE, pips).unwrap())
            .collect(),
    )
}

/// Scene with die faces pasted at the given top-left corners.
fn scene(width: usize, height: usize, dice: &[(u32, usize, usize)]) -> Vec<u8> {
    let mut data = vec![0u8; width * height];
    for &(pips, x0, y0) in dice {
        let face = die_face(pips);
        for y in 0..FACE {
            let row = (y0 + y) * width + x0;
            data[row..row + FACE].copy_from_slice(&face[y * FACE..(y + 1) * FACE]);
        }
    }
    data
}

fn small_grid_config() -> DetectConfig {
    DetectConfig {
        poses: PoseGrid::linspace((0.9, 1.1), 3, (-90.0, 90.0), 9),
        ..DetectConfig::default()
    }
}

#[test]
fn single_die_gives_one_detection_at_its_center() {
    let (width, height) = (300, 250);
    let data = scene(width, height, &[(5, 100, 80)]);
    // A lone corner pip correlates at about 0.7 with the two-pip face, which
    // can place a weak hypothesis just outside the die; keep it out here.
    let detector = Detector::new(&library(&[1, 3, 4, 5, 6]), small_grid_config()).unwrap();
    let report = detector
        .detect(ImageView::from_slice(&data, width, height).unwrap())
        .unwrap();

    assert_eq!(report.detections.len(), 1);
    let det = report.detections[0];
    assert_eq!(det.label, 5);
    assert!(det.score > 0.99);
    assert!((det.center.x - 130.0).abs() <= 2.0);
    assert!((det.center.y - 110.0).abs() <= 2.0);
    assert_eq!(report.counts.get(5), 1);
    assert_eq!(report.counts.total(), 1);
    assert_eq!(report.counts.iter().count(), 6);
    assert!(report.candidate_count >= 1);
    assert!(!report.occupancy.is_empty());
}

#[test]
fn different_faces_are_counted_per_label() {
    let (width, height) = (400, 200);
    let dice = [(1, 20, 30), (3, 120, 30), (6, 220, 30), (3, 320, 120)];
    let data = scene(width, height, &dice);
    let detector = Detector::new(&library(&[1, 3, 4, 5, 6]), small_grid_config()).unwrap();
    let report = detector
        .detect(ImageView::from_slice(&data, width, height).unwrap())
        .unwrap();

    assert_eq!(report.detections.len(), 4);
    assert_eq!(report.counts.get(1), 1);
    assert_eq!(report.counts.get(3), 2);
    assert_eq!(report.counts.get(6), 1);
    assert_eq!(report.counts.get(2), 0);
    assert_eq!(report.counts.iter().count(), 6);
    assert_eq!(report.counts.pip_sum(), 13);
}

#[test]
fn cap_keeps_six_of_seven_dice() {
    let (width, height) = (400, 300);
    let dice: Vec<(u32, usize, usize)> = (0..7)
        .map(|i| (5, 20 + (i % 4) * 90, 20 + (i / 4) * 140))
        .collect();
    let data = scene(width, height, &dice);
    let cfg = DetectConfig {
        poses: PoseGrid::new(vec![1.0], vec![0.0]),
        ..DetectConfig::default()
    };
    let detector = Detector::new(&library(&[5]), cfg).unwrap();
    let report = detector
        .detect(ImageView::from_slice(&data, width, height).unwrap())
        .unwrap();

    assert_eq!(report.detections.len(), 6);
    assert_eq!(report.counts.get(5), 6);
    assert!(report.detections.iter().all(|d| d.score > 0.99));
}

#[test]
fn empty_library_fails_before_scanning() {
    let err = Detector::new(&TemplateLibrary::default(), DetectConfig::default())
        .err()
        .unwrap();
    assert_eq!(err, DiceMatchError::EmptyTemplateLibrary);

    let data = vec![0u8; 50 * 50];
    let prepared = dicematch::lowlevel::PreparedScene::new(
        ImageView::from_slice(&data, 50, 50).unwrap(),
        0.2,
    )
    .unwrap();
    let err = collect_candidates(&prepared, &[], &DetectConfig::default(), None)
        .err()
        .unwrap();
    assert_eq!(err, DiceMatchError::EmptyTemplateLibrary);
}

#[test]
fn strict_threshold_without_perfect_match_detects_nothing() {
    let (width, height) = (200, 200);
    let data = scene(width, height, &[(5, 70, 70)]);
    let cfg = DetectConfig {
        score_threshold: 0.99,
        poses: PoseGrid::new(vec![1.0], vec![0.0]),
        ..DetectConfig::default()
    };
    let detector = Detector::new(&library(&[6]), cfg).unwrap();
    let report = detector
        .detect(ImageView::from_slice(&data, width, height).unwrap())
        .unwrap();

    assert!(report.detections.is_empty());
    assert!(report.occupancy.is_empty());
    assert_eq!(report.counts.total(), 0);
}

#[test]
fn rotated_die_is_found_by_a_rotated_pose() {
    // A two-pip face turned by 90 degrees shows its pips on the other diagonal.
    let (width, height) = (200, 200);
    let face = die_face(2);
    let mut data = vec![0u8; width * height];
    for y in 0..FACE {
        for x in 0..FACE {
            data[(50 + y) * width + 80 + x] = face[x * FACE + (FACE - 1 - y)];
        }
    }
    let cfg = DetectConfig {
        score_threshold: 0.9,
        poses: PoseGrid::new(vec![1.0], vec![0.0, 90.0]),
        diagnostics: DiagnosticsConfig {
            steps: true,
            ..DiagnosticsConfig::default()
        },
        ..DetectConfig::default()
    };
    let detector = Detector::new(&library(&[2]), cfg).unwrap();
    let report = detector
        .detect(ImageView::from_slice(&data, width, height).unwrap())
        .unwrap();

    assert_eq!(report.detections.len(), 1);
    assert_eq!(report.detections[0].angle_deg.abs(), 90.0);
    assert!((report.detections[0].center.x - 110.0).abs() <= 2.0);
    assert!((report.detections[0].center.y - 80.0).abs() <= 2.0);
    assert!(!report.steps.is_empty());
}

#[test]
fn diagnostics_do_not_change_detections() {
    let (width, height) = (300, 200);
    let data = scene(width, height, &[(4, 30, 40), (2, 180, 100)]);
    let view = ImageView::from_slice(&data, width, height).unwrap();
    let lib = library(&[1, 2, 3, 4, 5, 6]);

    let plain = Detector::new(&lib, small_grid_config())
        .unwrap()
        .detect(view)
        .unwrap();
    let cfg = DetectConfig {
        diagnostics: DiagnosticsConfig {
            heatmaps: true,
            candidates: true,
            steps: true,
        },
        ..small_grid_config()
    };
    let verbose = Detector::new(&lib, cfg).unwrap().detect(view).unwrap();

    assert_eq!(plain.detections, verbose.detections);
    assert_eq!(plain.occupancy, verbose.occupancy);
    assert!(plain.heatmaps.is_empty());
    assert!(plain.candidates.is_empty());
    assert!(plain.steps.is_empty());

    assert_eq!(verbose.heatmaps.len(), 6);
    let labels: Vec<u32> = verbose.heatmaps.iter().map(|h| h.label).collect();
    assert_eq!(labels, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(verbose.heatmaps[0].map.width(), 60);
    assert_eq!(verbose.heatmaps[0].map.height(), 40);
    assert_eq!(verbose.candidates.len(), verbose.candidate_count);
    assert!(verbose.steps.len() >= verbose.detections.len());
}

#[test]
fn repeated_detection_reuses_the_pose_cache() {
    let (width, height) = (200, 150);
    let data = scene(width, height, &[(3, 40, 40)]);
    let view = ImageView::from_slice(&data, width, height).unwrap();
    let detector = Detector::new(&library(&[3]), small_grid_config()).unwrap();
    let first = detector.detect(view).unwrap();
    let second = detector.detect(view).unwrap();
    assert_eq!(first.detections, second.detections);
    assert_eq!(first.detections.len(), 1);
}

#[test]
fn empty_pose_grid_detects_nothing() {
    let data = scene(200, 150, &[(3, 40, 40)]);
    let cfg = DetectConfig {
        poses: PoseGrid::new(vec![1.0], Vec::new()),
        ..DetectConfig::default()
    };
    let report = Detector::new(&library(&[3]), cfg)
        .unwrap()
        .detect(ImageView::from_slice(&data, 200, 150).unwrap())
        .unwrap();
    assert!(report.detections.is_empty());
    assert_eq!(report.candidate_count, 0);
}

#[test]
fn raised_cancel_flag_aborts_detection() {
    let data = scene(200, 150, &[(3, 40, 40)]);
    let detector = Detector::new(&library(&[3]), small_grid_config()).unwrap();
    let cancel = AtomicBool::new(true);
    let err = detector
        .detect_cancellable(ImageView::from_slice(&data, 200, 150).unwrap(), &cancel)
        .err()
        .unwrap();
    assert_eq!(err, DiceMatchError::Cancelled);

    let idle = AtomicBool::new(false);
    assert!(detector
        .detect_cancellable(ImageView::from_slice(&data, 200, 150).unwrap(), &idle)
        .is_ok());
}
