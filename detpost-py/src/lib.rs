//! Python bindings for the detpost detection post-processing library.
//!
//! This module exposes the pipeline to Python via PyO3; tensors are passed as
//! `float32` numpy arrays shaped `(1, 4 + C, N)` or `(1, N, 4 + C)`.

use numpy::{PyReadonlyArray3, PyUntypedArrayMethods};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use detpost::{
    AxisConvention as RustAxisConvention, DetPostError, Detection as RustDetection,
    DetectionConfig as RustDetectionConfig, DetectionPipeline as RustDetectionPipeline,
    FitPolicy as RustFitPolicy, GeometryContext as RustGeometryContext, LabelTable,
    NmsMode as RustNmsMode, TensorLayout, TensorView,
};

/// Convert a DetPostError to a Python exception.
fn to_py_err(err: DetPostError) -> PyErr {
    match err {
        DetPostError::InvalidConfig { .. } | DetPostError::InvalidGeometry { .. } => {
            PyValueError::new_err(err.to_string())
        }
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

fn parse_layout(layout: &str) -> PyResult<TensorLayout> {
    match layout.to_lowercase().as_str() {
        "channel_major" => Ok(TensorLayout::ChannelMajor),
        "anchor_major" => Ok(TensorLayout::AnchorMajor),
        _ => Err(PyValueError::new_err(
            "layout must be 'channel_major' or 'anchor_major'",
        )),
    }
}

/// One labeled box in display pixels.
#[pyclass]
#[derive(Clone)]
pub struct Detection {
    /// Class label.
    #[pyo3(get)]
    pub label: String,
    /// Class index in the model output.
    #[pyo3(get)]
    pub class_index: u16,
    /// Best-class score.
    #[pyo3(get)]
    pub confidence: f32,
    /// Top-left x in display pixels.
    #[pyo3(get)]
    pub x: f32,
    /// Top-left y in display pixels.
    #[pyo3(get)]
    pub y: f32,
    #[pyo3(get)]
    pub width: f32,
    #[pyo3(get)]
    pub height: f32,
}

#[pymethods]
impl Detection {
    fn __repr__(&self) -> String {
        format!(
            "Detection(label='{}', confidence={:.3}, x={:.1}, y={:.1}, width={:.1}, height={:.1})",
            self.label, self.confidence, self.x, self.y, self.width, self.height
        )
    }
}

impl From<RustDetection> for Detection {
    fn from(d: RustDetection) -> Self {
        Self {
            label: d.label,
            class_index: d.class_index,
            confidence: d.confidence,
            x: d.bbox.x,
            y: d.bbox.y,
            width: d.bbox.width,
            height: d.bbox.height,
        }
    }
}

/// Detection thresholds.
#[pyclass]
#[derive(Clone)]
pub struct DetectionConfig {
    inner: RustDetectionConfig,
}

#[pymethods]
impl DetectionConfig {
    /// Create a new DetectionConfig.
    ///
    /// Args:
    ///     confidence_threshold: Minimum best-class score, exclusive (default: 0.25)
    ///     iou_threshold: NMS overlap threshold, inclusive (default: 0.45)
    ///     min_box_size: Minimum model-space width and height (default: 10.0)
    ///     max_box_size: Maximum model-space width and height (default: 600.0)
    #[new]
    #[pyo3(signature = (confidence_threshold=0.25, iou_threshold=0.45, min_box_size=10.0, max_box_size=600.0))]
    fn new(
        confidence_threshold: f32,
        iou_threshold: f32,
        min_box_size: f32,
        max_box_size: f32,
    ) -> Self {
        Self {
            inner: RustDetectionConfig {
                confidence_threshold,
                iou_threshold,
                min_box_size,
                max_box_size,
            },
        }
    }

    /// Check the values against the ranges a UI would enforce.
    fn validate(&self) -> PyResult<()> {
        self.inner.validate().map_err(to_py_err)
    }

    #[getter]
    fn confidence_threshold(&self) -> f32 {
        self.inner.confidence_threshold
    }

    #[getter]
    fn iou_threshold(&self) -> f32 {
        self.inner.iou_threshold
    }

    fn __repr__(&self) -> String {
        format!(
            "DetectionConfig(confidence_threshold={}, iou_threshold={}, min_box_size={}, max_box_size={})",
            self.inner.confidence_threshold,
            self.inner.iou_threshold,
            self.inner.min_box_size,
            self.inner.max_box_size
        )
    }
}

/// Geometry of the frame that was fed to the model.
#[pyclass]
#[derive(Clone)]
pub struct GeometryContext {
    inner: RustGeometryContext,
}

#[pymethods]
impl GeometryContext {
    /// Create a new GeometryContext.
    ///
    /// Args:
    ///     dest_width: Destination frame width in pixels
    ///     dest_height: Destination frame height in pixels
    ///     model_dimension: Side of the square model input (default: 640.0)
    ///     fit_policy: "aspect_fit_letterbox" or "aspect_fill_crop" (default: "aspect_fit_letterbox")
    ///     axis_convention: "xy" or "yx_flipped" (default: "xy")
    #[new]
    #[pyo3(signature = (dest_width, dest_height, model_dimension=640.0, fit_policy="aspect_fit_letterbox", axis_convention="xy"))]
    fn new(
        dest_width: f32,
        dest_height: f32,
        model_dimension: f32,
        fit_policy: &str,
        axis_convention: &str,
    ) -> PyResult<Self> {
        let fit_policy = match fit_policy.to_lowercase().as_str() {
            "aspect_fit_letterbox" => RustFitPolicy::AspectFitLetterbox,
            "aspect_fill_crop" => RustFitPolicy::AspectFillCrop,
            _ => {
                return Err(PyValueError::new_err(
                    "fit_policy must be 'aspect_fit_letterbox' or 'aspect_fill_crop'",
                ))
            }
        };
        let axis_convention = match axis_convention.to_lowercase().as_str() {
            "xy" => RustAxisConvention::Xy,
            "yx_flipped" => RustAxisConvention::YxFlipped,
            _ => {
                return Err(PyValueError::new_err(
                    "axis_convention must be 'xy' or 'yx_flipped'",
                ))
            }
        };
        let inner = RustGeometryContext::new(model_dimension, dest_width, dest_height, fit_policy)
            .with_axis_convention(axis_convention);
        inner.validate().map_err(to_py_err)?;
        Ok(Self { inner })
    }

    fn __repr__(&self) -> String {
        let policy = match self.inner.fit_policy {
            RustFitPolicy::AspectFitLetterbox => "aspect_fit_letterbox",
            RustFitPolicy::AspectFillCrop => "aspect_fill_crop",
        };
        format!(
            "GeometryContext(dest_width={}, dest_height={}, model_dimension={}, fit_policy='{}')",
            self.inner.dest_width, self.inner.dest_height, self.inner.model_dimension, policy
        )
    }
}

/// Reusable decoder holding labels and NMS options.
#[pyclass]
pub struct Detector {
    inner: RustDetectionPipeline,
    num_classes: usize,
}

#[pymethods]
impl Detector {
    /// Create a new Detector.
    ///
    /// Args:
    ///     labels: Class names indexed by class id (default: COCO)
    ///     per_class_nms: Suppress only within the same class (default: False)
    ///     max_detections: Keep at most this many boxes (default: unlimited)
    ///     clip_to_frame: Clip boxes to the destination frame (default: False)
    ///     parallel: Scan anchors on the rayon pool (default: False)
    #[new]
    #[pyo3(signature = (labels=None, per_class_nms=false, max_detections=None, clip_to_frame=false, parallel=false))]
    fn new(
        labels: Option<Vec<String>>,
        per_class_nms: bool,
        max_detections: Option<usize>,
        clip_to_frame: bool,
        parallel: bool,
    ) -> Self {
        let labels = labels.map(LabelTable::new).unwrap_or_default();
        let num_classes = labels.len();
        let nms_mode = if per_class_nms {
            RustNmsMode::PerClass
        } else {
            RustNmsMode::ClassAgnostic
        };
        let inner = RustDetectionPipeline::new()
            .with_labels(labels)
            .with_nms_mode(nms_mode)
            .with_max_detections(max_detections)
            .with_clipping(clip_to_frame)
            .with_parallel(parallel);
        Self { inner, num_classes }
    }

    /// Number of classes the detector expects in the tensor.
    #[getter]
    fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Decode a model output tensor into detections.
    ///
    /// Args:
    ///     tensor: 3D float32 numpy array, (1, 4 + C, N) or (1, N, 4 + C)
    ///     geometry: GeometryContext of the submitted frame
    ///     config: DetectionConfig (default: DetectionConfig())
    ///     layout: "channel_major" or "anchor_major" (default: "channel_major")
    ///
    /// Returns:
    ///     List of Detection objects, sorted by confidence (best first)
    #[pyo3(signature = (tensor, geometry, config = None, layout = "channel_major"))]
    fn decode(
        &self,
        tensor: PyReadonlyArray3<'_, f32>,
        geometry: &GeometryContext,
        config: Option<DetectionConfig>,
        layout: &str,
    ) -> PyResult<Vec<Detection>> {
        let layout = parse_layout(layout)?;
        let shape = tensor.shape().to_vec();
        let data = tensor.as_slice()?;
        let view = TensorView::from_shape(data, &shape, layout).map_err(to_py_err)?;
        let cfg = config.map(|c| c.inner).unwrap_or_default();
        let detections = self
            .inner
            .run(view, self.num_classes, &cfg, &geometry.inner)
            .map_err(to_py_err)?;
        Ok(detections.into_iter().map(Detection::from).collect())
    }

    fn __repr__(&self) -> String {
        format!(
            "Detector(num_classes={}, parallel={})",
            self.num_classes,
            self.inner.is_parallel()
        )
    }
}

/// Convenience function to decode a tensor with COCO labels.
///
/// Args:
///     tensor: 3D float32 numpy array, (1, 84, N) or (1, N, 84)
///     dest_width: Destination frame width in pixels
///     dest_height: Destination frame height in pixels
///     config: DetectionConfig (default: DetectionConfig())
///     fit_policy: "aspect_fit_letterbox" or "aspect_fill_crop" (default: "aspect_fit_letterbox")
///     layout: "channel_major" or "anchor_major" (default: "channel_major")
///
/// Returns:
///     List of Detection objects, sorted by confidence (best first)
#[pyfunction]
#[pyo3(signature = (tensor, dest_width, dest_height, config = None, fit_policy = "aspect_fit_letterbox", layout = "channel_major"))]
fn decode(
    tensor: PyReadonlyArray3<'_, f32>,
    dest_width: f32,
    dest_height: f32,
    config: Option<DetectionConfig>,
    fit_policy: &str,
    layout: &str,
) -> PyResult<Vec<Detection>> {
    let geometry = GeometryContext::new(dest_width, dest_height, 640.0, fit_policy, "xy")?;
    let detector = Detector::new(None, false, None, false, false);
    detector.decode(tensor, &geometry, config, layout)
}

/// Python module for detection post-processing.
#[pymodule]
fn _detpost(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Detection>()?;
    m.add_class::<DetectionConfig>()?;
    m.add_class::<GeometryContext>()?;
    m.add_class::<Detector>()?;
    m.add_function(wrap_pyfunction!(decode, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
