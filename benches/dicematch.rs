use dicematch::lowlevel::{resolve, DefaultKernel, Kernel, ResolveConfig, ScanParams, TemplatePlan};
use dicematch::{DetectConfig, Detector, ImageView, PoseGrid, Template, TemplateLibrary};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

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

fn make_scene(width: usize, height: usize) -> Vec<u8> {
    let mut scene = vec![0u8; width * height];
    for (i, pips) in (1..=6).enumerate() {
        let x0 = 20 + (i % 3) * 120;
        let y0 = 20 + (i / 3) * 120;
        let face = die_face(pips);
        for y in 0..FACE {
            let row = (y0 + y) * width + x0;
            scene[row..row + FACE].copy_from_slice(&face[y * FACE..(y + 1) * FACE]);
        }
    }
    scene
}

fn bench_detector(c: &mut Criterion) {
    let (width, height) = (400, 280);
    let scene = make_scene(width, height);
    let view = ImageView::from_slice(&scene, width, height).unwrap();
    let library = TemplateLibrary::new(
        (1..=6)
            .map(|pips| Template::new(die_face(pips), FACE, FACE, pips).unwrap())
            .collect(),
    );

    let detector = Detector::new(
        &library,
        DetectConfig {
            poses: PoseGrid::linspace((0.9, 1.1), 3, (-45.0, 45.0), 8),
            ..DetectConfig::default()
        },
    )
    .unwrap();
    // Posed templates are built lazily; warm the cache once.
    detector.detect(view).unwrap();
    c.bench_function("detect_6_templates_24_poses", |b| {
        b.iter(|| black_box(detector.detect(view).unwrap()));
    });

    let no_rotation = Detector::new(
        &library,
        DetectConfig {
            resize_factor: 0.5,
            poses: PoseGrid::new(vec![1.0], vec![0.0]),
            ..DetectConfig::default()
        },
    )
    .unwrap();
    c.bench_function("detect_half_resolution_single_pose", |b| {
        b.iter(|| black_box(no_rotation.detect(view).unwrap()));
    });
}

fn bench_kernel(c: &mut Criterion) {
    let (width, height) = (400, 280);
    let scene = make_scene(width, height);
    let view = ImageView::from_slice(&scene, width, height).unwrap();
    let face = die_face(5);
    let plan = TemplatePlan::from_view(ImageView::from_slice(&face, FACE, FACE).unwrap()).unwrap();
    let params = ScanParams {
        min_var_i: 1.0,
        min_score: 0.6,
    };
    c.bench_function("zncc_scan_full_resolution", |b| {
        b.iter(|| black_box(DefaultKernel::scan_full(view, &plan, params, None)));
    });
}

fn bench_resolver(c: &mut Criterion) {
    let (width, height) = (400, 280);
    let scene = make_scene(width, height);
    let view = ImageView::from_slice(&scene, width, height).unwrap();
    let library = TemplateLibrary::new(
        (1..=6)
            .map(|pips| Template::new(die_face(pips), FACE, FACE, pips).unwrap())
            .collect(),
    );
    let detector = Detector::new(
        &library,
        DetectConfig {
            score_threshold: 0.3,
            poses: PoseGrid::linspace((0.9, 1.1), 3, (-45.0, 45.0), 8),
            diagnostics: dicematch::DiagnosticsConfig {
                candidates: true,
                ..Default::default()
            },
            ..DetectConfig::default()
        },
    )
    .unwrap();
    let candidates = detector.detect(view).unwrap().candidates;
    let cfg = ResolveConfig::default();
    c.bench_function("resolve_low_threshold_candidates", |b| {
        b.iter(|| black_box(resolve(&candidates, width, height, &cfg)));
    });
}

criterion_group!(benches, bench_detector, bench_kernel, bench_resolver);
criterion_main!(benches);
