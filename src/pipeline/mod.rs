//! End-to-end decoding of one detection tensor.
//!
//! `DetectionPipeline` runs extraction, suppression, coordinate mapping and
//! labeling in that order. It holds no per-frame state: thresholds and
//! geometry are passed on every call, so one pipeline value can serve any
//! number of frames or threads.

use crate::candidate::nms::{suppress_with_mode, NmsMode};
use crate::candidate::Candidate;
use crate::geometry::mapper::GeometryContext;
use crate::geometry::Rect;
use crate::kernel::{DefaultKernel, ExtractParams, Kernel};
use crate::labels::LabelTable;
use crate::tensor::{OwnedTensor, TensorView, BOX_CHANNELS};
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{DetPostError, DetPostResult};
use std::fmt::Display;

mod config;
mod gate;

pub use config::{DetectionConfig, SharedConfig, BOX_SIZE_RANGE, THRESHOLD_RANGE};
pub use gate::{FrameGate, FrameGuard};

/// One labeled box in display space.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// Human-readable class label.
    pub label: String,
    /// Index of the class in the model output.
    pub class_index: u16,
    /// Raw best-class score, strictly above the confidence threshold.
    pub confidence: f32,
    /// Top-left-form box in display pixels.
    pub bbox: Rect,
}

/// Detection post-processing pipeline.
#[derive(Clone, Debug, Default)]
pub struct DetectionPipeline {
    labels: LabelTable,
    nms_mode: NmsMode,
    max_detections: Option<usize>,
    clip_to_frame: bool,
    parallel: bool,
}

impl DetectionPipeline {
    /// Creates a pipeline with COCO labels and class-agnostic NMS.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the label table.
    pub fn with_labels(mut self, labels: LabelTable) -> Self {
        self.labels = labels;
        self
    }

    /// Selects how NMS groups boxes.
    pub fn with_nms_mode(mut self, nms_mode: NmsMode) -> Self {
        self.nms_mode = nms_mode;
        self
    }

    /// Keeps at most `max` detections (the highest-confidence ones).
    pub fn with_max_detections(mut self, max: Option<usize>) -> Self {
        self.max_detections = max;
        self
    }

    /// Clips mapped boxes to the destination frame.
    pub fn with_clipping(mut self, clip_to_frame: bool) -> Self {
        self.clip_to_frame = clip_to_frame;
        self
    }

    /// Scans anchors on the rayon pool when the `rayon` feature is enabled.
    ///
    /// Without the feature the flag is recorded but the scan stays
    /// sequential.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns the label table.
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Returns whether parallel extraction was requested.
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Decodes `tensor` into labeled display-space detections.
    ///
    /// The result is ordered by descending confidence. A tensor carrying more
    /// class channels than `num_classes` yields an empty result; one carrying
    /// fewer fails with [`DetPostError::ShapeMismatch`].
    pub fn run(
        &self,
        tensor: TensorView<'_>,
        num_classes: usize,
        config: &DetectionConfig,
        ctx: &GeometryContext,
    ) -> DetPostResult<Vec<Detection>> {
        let config = *config;
        let ctx = *ctx;
        let _span = trace_span!(
            "pipeline_run",
            anchors = tensor.anchors(),
            classes = num_classes
        )
        .entered();

        ctx.validate()?;

        let expected = BOX_CHANNELS.saturating_add(num_classes);
        if tensor.channels() > expected {
            trace_warn!(
                "class_count_disagreement",
                expected = expected,
                got = tensor.channels()
            );
            return Ok(Vec::new());
        }

        let candidates = match self.extract(tensor, num_classes, config.extract_params()) {
            Ok(candidates) => candidates,
            Err(err) => {
                trace_warn!("shape_mismatch", error = err.to_string().as_str());
                return Err(err);
            }
        };
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let kept = {
            let _span = trace_span!("suppress", candidates = candidates.len()).entered();
            suppress_with_mode(candidates, config.iou_threshold, self.nms_mode)
        };
        trace_event!("suppress_kept", count = kept.len());

        let limit = self.max_detections.unwrap_or(usize::MAX);
        Ok(kept
            .into_iter()
            .take(limit)
            .map(|candidate| self.to_detection(candidate, &ctx))
            .collect())
    }

    /// Like [`DetectionPipeline::run`], reading thresholds from a shared
    /// record.
    ///
    /// The record is snapshotted once before extraction; later writes only
    /// affect subsequent runs.
    pub fn run_shared(
        &self,
        tensor: TensorView<'_>,
        num_classes: usize,
        config: &SharedConfig,
        ctx: &GeometryContext,
    ) -> DetPostResult<Vec<Detection>> {
        let snapshot = config.snapshot();
        self.run(tensor, num_classes, &snapshot, ctx)
    }

    /// Runs `infer` to obtain the tensor, then decodes it.
    ///
    /// An inference failure is reported as
    /// [`DetPostError::ModelUnavailable`].
    pub fn run_inference<F, E>(
        &self,
        infer: F,
        num_classes: usize,
        config: &DetectionConfig,
        ctx: &GeometryContext,
    ) -> DetPostResult<Vec<Detection>>
    where
        F: FnOnce() -> Result<OwnedTensor, E>,
        E: Display,
    {
        let tensor = infer().map_err(|err| DetPostError::ModelUnavailable {
            reason: err.to_string(),
        })?;
        self.run(tensor.view(), num_classes, config, ctx)
    }

    /// Per-frame entry point that never fails.
    ///
    /// Any error from [`DetectionPipeline::run_inference`] is logged and the
    /// frame yields no detections; the next frame starts fresh.
    pub fn run_frame<F, E>(
        &self,
        infer: F,
        num_classes: usize,
        config: &DetectionConfig,
        ctx: &GeometryContext,
    ) -> Vec<Detection>
    where
        F: FnOnce() -> Result<OwnedTensor, E>,
        E: Display,
    {
        match self.run_inference(infer, num_classes, config, ctx) {
            Ok(detections) => detections,
            Err(err) => {
                trace_warn!("frame_failed", error = err.to_string().as_str());
                Vec::new()
            }
        }
    }

    fn extract(
        &self,
        tensor: TensorView<'_>,
        num_classes: usize,
        params: ExtractParams,
    ) -> DetPostResult<Vec<Candidate>> {
        #[cfg(feature = "rayon")]
        if self.parallel {
            return crate::kernel::rayon::extract_par::<DefaultKernel>(tensor, num_classes, params);
        }
        <DefaultKernel as Kernel>::extract(tensor, num_classes, params)
    }

    fn to_detection(&self, candidate: Candidate, ctx: &GeometryContext) -> Detection {
        let mut bbox = ctx.map_to_display(candidate.bbox);
        if self.clip_to_frame {
            bbox = bbox.clamped(ctx.dest_width, ctx.dest_height);
        }
        Detection {
            label: self.labels.label(candidate.class_index).to_owned(),
            class_index: candidate.class_index,
            confidence: candidate.score,
            bbox,
        }
    }
}
