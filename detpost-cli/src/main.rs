use clap::Parser;
use detpost::io::load_tensor;
use detpost::{
    sigmoid_in_place, AxisConvention, Detection, DetectionConfig, DetectionPipeline, FitPolicy,
    GeometryContext, LabelTable, NmsMode, OwnedTensor, TensorLayout,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Detection tensor decoder (JSON config driven)")]
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

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum LayoutConfig {
    #[default]
    ChannelMajor,
    AnchorMajor,
}

impl From<LayoutConfig> for TensorLayout {
    fn from(value: LayoutConfig) -> Self {
        match value {
            LayoutConfig::ChannelMajor => TensorLayout::ChannelMajor,
            LayoutConfig::AnchorMajor => TensorLayout::AnchorMajor,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum FitPolicyConfig {
    AspectFillCrop,
    #[default]
    AspectFitLetterbox,
}

impl From<FitPolicyConfig> for FitPolicy {
    fn from(value: FitPolicyConfig) -> Self {
        match value {
            FitPolicyConfig::AspectFillCrop => FitPolicy::AspectFillCrop,
            FitPolicyConfig::AspectFitLetterbox => FitPolicy::AspectFitLetterbox,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum AxisConventionConfig {
    #[default]
    Xy,
    YxFlipped,
}

impl From<AxisConventionConfig> for AxisConvention {
    fn from(value: AxisConventionConfig) -> Self {
        match value {
            AxisConventionConfig::Xy => AxisConvention::Xy,
            AxisConventionConfig::YxFlipped => AxisConvention::YxFlipped,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum NmsModeConfig {
    #[default]
    ClassAgnostic,
    PerClass,
}

impl From<NmsModeConfig> for NmsMode {
    fn from(value: NmsModeConfig) -> Self {
        match value {
            NmsModeConfig::ClassAgnostic => NmsMode::ClassAgnostic,
            NmsModeConfig::PerClass => NmsMode::PerClass,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DetectionConfigJson {
    confidence_threshold: f32,
    iou_threshold: f32,
    min_box_size: f32,
    max_box_size: f32,
}

impl Default for DetectionConfigJson {
    fn default() -> Self {
        let cfg = DetectionConfig::default();
        Self {
            confidence_threshold: cfg.confidence_threshold,
            iou_threshold: cfg.iou_threshold,
            min_box_size: cfg.min_box_size,
            max_box_size: cfg.max_box_size,
        }
    }
}

impl From<DetectionConfigJson> for DetectionConfig {
    fn from(value: DetectionConfigJson) -> Self {
        Self {
            confidence_threshold: value.confidence_threshold,
            iou_threshold: value.iou_threshold,
            min_box_size: value.min_box_size,
            max_box_size: value.max_box_size,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct GeometryJson {
    model_dimension: f32,
    dest_width: f32,
    dest_height: f32,
    fit_policy: FitPolicyConfig,
    axis_convention: AxisConventionConfig,
}

impl Default for GeometryJson {
    fn default() -> Self {
        let ctx = GeometryContext::default();
        Self {
            model_dimension: ctx.model_dimension,
            dest_width: ctx.dest_width,
            dest_height: ctx.dest_height,
            fit_policy: FitPolicyConfig::default(),
            axis_convention: AxisConventionConfig::default(),
        }
    }
}

impl From<GeometryJson> for GeometryContext {
    fn from(value: GeometryJson) -> Self {
        GeometryContext::new(
            value.model_dimension,
            value.dest_width,
            value.dest_height,
            value.fit_policy.into(),
        )
        .with_axis_convention(value.axis_convention.into())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PipelineJson {
    nms_mode: NmsModeConfig,
    max_detections: Option<usize>,
    clip_to_frame: bool,
    parallel: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    tensor_path: String,
    num_classes: usize,
    anchors: usize,
    layout: LayoutConfig,
    labels_path: Option<String>,
    output_path: Option<String>,
    apply_sigmoid: bool,
    detection: DetectionConfigJson,
    geometry: GeometryJson,
    pipeline: PipelineJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tensor_path: String::new(),
            num_classes: 80,
            anchors: 0,
            layout: LayoutConfig::default(),
            labels_path: None,
            output_path: None,
            apply_sigmoid: false,
            detection: DetectionConfigJson::default(),
            geometry: GeometryJson::default(),
            pipeline: PipelineJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    label: String,
    class_index: u16,
    confidence: f32,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl From<Detection> for DetectionRecord {
    fn from(value: Detection) -> Self {
        Self {
            label: value.label,
            class_index: value.class_index,
            confidence: value.confidence,
            x: value.bbox.x,
            y: value.bbox.y,
            width: value.bbox.width,
            height: value.bbox.height,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    count: usize,
    detections: Vec<DetectionRecord>,
}

/// Applies the logistic sigmoid to every class-score value in place.
fn activate_class_scores(tensor: &mut OwnedTensor, layout: TensorLayout) {
    let channels = tensor.channels();
    let anchors = tensor.anchors();
    let data = tensor.data_mut();
    match layout {
        TensorLayout::ChannelMajor => sigmoid_in_place(&mut data[4 * anchors..]),
        TensorLayout::AnchorMajor => {
            for row in data.chunks_exact_mut(channels) {
                sigmoid_in_place(&mut row[4..]);
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env()
                    .add_directive("detpost=info".parse()?)
                    .add_directive("detpost_cli=info".parse()?),
            )
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
    if config.tensor_path.is_empty() {
        return Err("tensor_path must be set in the config".into());
    }
    if config.anchors == 0 || config.num_classes == 0 {
        return Err("anchors and num_classes must be at least 1".into());
    }
    if config.pipeline.max_detections == Some(0) {
        return Err("max_detections must be at least 1 when set".into());
    }

    let detection: DetectionConfig = config.detection.into();
    detection.validate()?;
    let geometry: GeometryContext = config.geometry.into();
    geometry.validate()?;

    let layout: TensorLayout = config.layout.into();
    let mut tensor = load_tensor(
        &config.tensor_path,
        4 + config.num_classes,
        config.anchors,
        layout,
    )?;
    if config.apply_sigmoid {
        activate_class_scores(&mut tensor, layout);
    }

    let labels = match &config.labels_path {
        Some(path) => LabelTable::from_lines(&fs::read_to_string(path)?),
        None => LabelTable::coco(),
    };

    let pipeline = DetectionPipeline::new()
        .with_labels(labels)
        .with_nms_mode(config.pipeline.nms_mode.into())
        .with_max_detections(config.pipeline.max_detections)
        .with_clipping(config.pipeline.clip_to_frame)
        .with_parallel(config.pipeline.parallel);

    let detections = pipeline.run(tensor.view(), config.num_classes, &detection, &geometry)?;
    tracing::info!(
        tensor = config.tensor_path.as_str(),
        count = detections.len(),
        "decoded tensor dump"
    );
    let detections: Vec<DetectionRecord> =
        detections.into_iter().map(DetectionRecord::from).collect();
    let output = Output {
        count: detections.len(),
        detections,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
