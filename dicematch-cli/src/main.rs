use clap::Parser;
use dicematch::bank::load_template_dir;
use dicematch::image::io::{image_paths, load_dynamic_image, owned_from_gray_image, save_image};
use dicematch::preprocess::{preprocess_image, PreprocessConfig};
use dicematch::render::diagnostics::{candidate_cloud, heatmap_to_color, occupancy_to_gray};
use dicematch::render::{annotate_steps, draw_detections_mut, AnnotateStyle};
use dicematch::{
    DetectConfig, Detection, DetectionReport, Detector, DiagnosticsConfig, OwnedImage, PoseGrid,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "DiceMatch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

/// Either explicit values or an inclusive linear range.
#[derive(Debug, Deserialize)]
#[serde(untagged, deny_unknown_fields)]
enum AxisJson {
    Values(Vec<f32>),
    Range { start: f32, stop: f32, count: usize },
}

impl AxisJson {
    fn values(&self) -> Vec<f32> {
        match self {
            AxisJson::Values(values) => values.clone(),
            AxisJson::Range { start, stop, count } => {
                dicematch::lowlevel::linspace(*start, *stop, *count)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DetectConfigJson {
    resize_factor: f32,
    scales: AxisJson,
    rotations_deg: AxisJson,
    score_threshold: f32,
    overlap_threshold: f32,
    max_detections: usize,
    max_label: u32,
    fill_value: u8,
    min_var_i: f32,
    parallel: bool,
}

impl Default for DetectConfigJson {
    fn default() -> Self {
        let cfg = DetectConfig::default();
        Self {
            resize_factor: cfg.resize_factor,
            scales: AxisJson::Values(cfg.poses.scales().to_vec()),
            rotations_deg: AxisJson::Values(cfg.poses.rotations_deg().to_vec()),
            score_threshold: cfg.score_threshold,
            overlap_threshold: cfg.overlap_threshold,
            max_detections: cfg.max_detections,
            max_label: cfg.max_label,
            fill_value: cfg.fill_value,
            min_var_i: cfg.min_var_i,
            parallel: cfg.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PreprocessConfigJson {
    enabled: bool,
    roi_offset: [i32; 2],
    roi_radius_scale: f32,
    blur_sigma: f32,
    threshold: u8,
    open_radius: u8,
    close_radius: u8,
}

impl Default for PreprocessConfigJson {
    fn default() -> Self {
        let cfg = PreprocessConfig::default();
        Self {
            enabled: false,
            roi_offset: [cfg.roi_offset.0, cfg.roi_offset.1],
            roi_radius_scale: cfg.roi_radius_scale,
            blur_sigma: cfg.blur_sigma,
            threshold: cfg.threshold,
            open_radius: cfg.open_radius,
            close_radius: cfg.close_radius,
        }
    }
}

impl From<&PreprocessConfigJson> for PreprocessConfig {
    fn from(value: &PreprocessConfigJson) -> Self {
        Self {
            roi_offset: (value.roi_offset[0], value.roi_offset[1]),
            roi_radius_scale: value.roi_radius_scale,
            blur_sigma: value.blur_sigma,
            threshold: value.threshold,
            open_radius: value.open_radius,
            close_radius: value.close_radius,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct Config {
    /// Single scene photo.
    image_path: Option<String>,
    /// Directory of scene photos, processed in file-name order.
    image_dir: Option<String>,
    templates_dir: String,
    output_path: Option<String>,
    annotated_path: Option<String>,
    processed_path: Option<String>,
    diagnostics_dir: Option<String>,
    preprocess: PreprocessConfigJson,
    detect: DetectConfigJson,
}

impl Config {
    /// Scene photos to process, in order.
    fn inputs(&self) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
        match (&self.image_path, &self.image_dir) {
            (Some(path), None) => Ok(vec![PathBuf::from(path)]),
            (None, Some(dir)) => Ok(image_paths(dir)?),
            _ => Err("exactly one of image_path and image_dir must be set".into()),
        }
    }

    fn is_batch(&self) -> bool {
        self.image_dir.is_some()
    }

    fn detect_config(&self) -> DetectConfig {
        let detect = &self.detect;
        let want_diagnostics = self.diagnostics_dir.is_some();
        DetectConfig {
            resize_factor: detect.resize_factor,
            poses: PoseGrid::new(detect.scales.values(), detect.rotations_deg.values()),
            score_threshold: detect.score_threshold,
            overlap_threshold: detect.overlap_threshold,
            max_detections: detect.max_detections,
            max_label: detect.max_label,
            fill_value: detect.fill_value,
            min_var_i: detect.min_var_i,
            parallel: detect.parallel,
            diagnostics: DiagnosticsConfig {
                heatmaps: want_diagnostics,
                candidates: want_diagnostics,
                steps: want_diagnostics,
            },
        }
    }

    /// Output locations for the `idx`-th input.
    ///
    /// In batch mode file paths get an `_idx` suffix before the extension
    /// and the diagnostics directory gets one subdirectory per image.
    fn outputs_for(&self, idx: usize) -> ImageOutputs {
        let per_image = |path: &Option<String>| {
            path.as_deref().map(|p| {
                if self.is_batch() {
                    indexed_path(Path::new(p), idx)
                } else {
                    PathBuf::from(p)
                }
            })
        };
        ImageOutputs {
            annotated: per_image(&self.annotated_path),
            processed: per_image(&self.processed_path),
            diagnostics: self.diagnostics_dir.as_deref().map(|dir| {
                if self.is_batch() {
                    Path::new(dir).join(idx.to_string())
                } else {
                    PathBuf::from(dir)
                }
            }),
        }
    }
}

#[derive(Debug, Default, PartialEq)]
struct ImageOutputs {
    annotated: Option<PathBuf>,
    processed: Option<PathBuf>,
    diagnostics: Option<PathBuf>,
}

/// `dir/name.ext` becomes `dir/name_idx.ext`.
fn indexed_path(path: &Path, idx: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{idx}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{idx}"),
    };
    path.with_file_name(name)
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    label: u32,
    score: f32,
    center_x: f32,
    center_y: f32,
    width: f32,
    height: f32,
    angle_deg: f32,
}

impl From<&Detection> for DetectionRecord {
    fn from(value: &Detection) -> Self {
        Self {
            label: value.label,
            score: value.score,
            center_x: value.center.x,
            center_y: value.center.y,
            width: value.box_size.width,
            height: value.box_size.height,
            angle_deg: value.angle_deg,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    detections: Vec<DetectionRecord>,
    counts: BTreeMap<u32, usize>,
    total: usize,
    pip_sum: u64,
    candidates: usize,
}

/// Report of one input photo.
#[derive(Debug, Serialize)]
struct ImageOutput {
    image: String,
    #[serde(flatten)]
    report: Output,
}

impl From<&DetectionReport> for Output {
    fn from(report: &DetectionReport) -> Self {
        Self {
            detections: report.detections.iter().map(DetectionRecord::from).collect(),
            counts: report.counts.iter().collect(),
            total: report.counts.total(),
            pip_sum: report.counts.pip_sum(),
            candidates: report.candidate_count,
        }
    }
}

fn write_diagnostics(
    dir: &Path,
    scene: &OwnedImage,
    report: &DetectionReport,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)?;
    for heatmap in &report.heatmaps {
        let path = dir.join(format!("heatmap_label_{}.png", heatmap.label));
        save_image(&heatmap_to_color(&heatmap.map), path)?;
    }
    save_image(
        &candidate_cloud(scene.view(), &report.candidates),
        dir.join("candidate_cloud.png"),
    )?;
    let style = AnnotateStyle::default();
    let steps = annotate_steps(scene.view(), &report.detections, &style);
    for (idx, (img, det)) in steps.iter().zip(&report.detections).enumerate() {
        let path = dir.join(format!("step_{:02}_label_{}.png", idx + 1, det.label));
        save_image(img, path)?;
    }
    save_image(&occupancy_to_gray(&report.occupancy), dir.join("final_mask.png"))?;
    Ok(())
}

fn create_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Preprocesses, matches and writes the per-image outputs of one photo.
fn process_image(
    path: &Path,
    config: &Config,
    detector: &Detector,
    outputs: &ImageOutputs,
) -> Result<Output, Box<dyn std::error::Error>> {
    let photo = load_dynamic_image(path)?;
    let scene = if config.preprocess.enabled {
        let processed = preprocess_image(&photo, &PreprocessConfig::from(&config.preprocess))?;
        if let Some(out) = &outputs.processed {
            create_parent(out)?;
            save_image(&processed, out)?;
        }
        owned_from_gray_image(&processed)?
    } else {
        let gray = photo.to_luma8();
        if let Some(out) = &outputs.processed {
            create_parent(out)?;
            save_image(&gray, out)?;
        }
        owned_from_gray_image(&gray)?
    };

    let report = detector.detect(scene.view())?;
    tracing::info!(
        image = %path.display(),
        detections = report.detections.len(),
        candidates = report.candidate_count,
        "detection finished"
    );

    if let Some(out) = &outputs.annotated {
        let mut annotated = photo.to_rgb8();
        draw_detections_mut(&mut annotated, &report.detections, &AnnotateStyle::default());
        create_parent(out)?;
        save_image(&annotated, out)?;
    }
    if let Some(dir) = &outputs.diagnostics {
        write_diagnostics(dir, &scene, &report)?;
    }
    Ok(Output::from(&report))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("dicematch=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.templates_dir.is_empty() {
        return Err("templates_dir must be set in the config".into());
    }
    let inputs = config.inputs()?;
    if inputs.is_empty() {
        tracing::warn!("no input images found");
    }

    // One detector for the whole batch keeps the posed templates cached.
    let library = load_template_dir(&config.templates_dir)?;
    let detector = Detector::new(&library, config.detect_config())?;

    let mut reports = Vec::with_capacity(inputs.len());
    for (idx, path) in inputs.iter().enumerate() {
        let report = process_image(path, &config, &detector, &config.outputs_for(idx))?;
        reports.push(ImageOutput {
            image: path.display().to_string(),
            report,
        });
    }

    let json = if config.is_batch() {
        serde_json::to_string_pretty(&reports)?
    } else {
        match reports.first() {
            Some(report) => serde_json::to_string_pretty(report)?,
            None => return Err("no input image".into()),
        }
    };
    match &config.output_path {
        Some(path) => {
            create_parent(Path::new(path))?;
            fs::write(path, json)?
        }
        None => println!("{json}"),
    }

    Ok(())
}
