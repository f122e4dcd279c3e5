//! Detection thresholds and their live-adjustable shared form.

use crate::kernel::ExtractParams;
use crate::util::{DetPostError, DetPostResult};
use std::sync::atomic::{AtomicU32, Ordering};

/// Legal range for the confidence and IoU thresholds.
pub const THRESHOLD_RANGE: (f32, f32) = (0.1, 1.0);

/// Legal range for the box size bounds, in model-space pixels.
pub const BOX_SIZE_RANGE: (f32, f32) = (5.0, 1000.0);

/// Thresholds applied during one pipeline run.
///
/// Scores are compared as they appear in the tensor: no sigmoid or softmax
/// is applied. Models that emit raw logits must be activated by the caller
/// first (see [`crate::sigmoid_in_place`]).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionConfig {
    /// A candidate's best class score must be strictly above this value.
    pub confidence_threshold: f32,
    /// Lower-scored boxes with IoU at or above this value are suppressed.
    pub iou_threshold: f32,
    /// Minimum model-space box width and height.
    pub min_box_size: f32,
    /// Maximum model-space box width and height.
    pub max_box_size: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            min_box_size: 10.0,
            max_box_size: 600.0,
        }
    }
}

impl DetectionConfig {
    /// Checks the legal ranges a UI is expected to enforce.
    ///
    /// The pipeline itself does not call this; out-of-range values are
    /// applied as given.
    pub fn validate(&self) -> DetPostResult<()> {
        let in_range = |v: f32, (lo, hi): (f32, f32)| v >= lo && v <= hi;
        if !in_range(self.confidence_threshold, THRESHOLD_RANGE) {
            return Err(DetPostError::InvalidConfig {
                reason: "confidence_threshold must be within [0.1, 1.0]",
            });
        }
        if !in_range(self.iou_threshold, THRESHOLD_RANGE) {
            return Err(DetPostError::InvalidConfig {
                reason: "iou_threshold must be within [0.1, 1.0]",
            });
        }
        if !in_range(self.min_box_size, BOX_SIZE_RANGE)
            || !in_range(self.max_box_size, BOX_SIZE_RANGE)
        {
            return Err(DetPostError::InvalidConfig {
                reason: "box sizes must be within [5, 1000]",
            });
        }
        if self.min_box_size >= self.max_box_size {
            return Err(DetPostError::InvalidConfig {
                reason: "min_box_size must be below max_box_size",
            });
        }
        Ok(())
    }

    /// Extraction filters derived from this config.
    pub fn extract_params(&self) -> ExtractParams {
        ExtractParams {
            confidence_threshold: self.confidence_threshold,
            min_box_size: self.min_box_size,
            max_box_size: self.max_box_size,
        }
    }
}

/// Detection thresholds shared with a UI thread.
///
/// Each field is stored as the bit pattern of an `f32` in its own atomic, so
/// setters never block and readers never see a half-written float. A run
/// takes one [`SharedConfig::snapshot`] before extraction and uses it
/// throughout.
#[derive(Debug)]
pub struct SharedConfig {
    confidence_threshold: AtomicU32,
    iou_threshold: AtomicU32,
    min_box_size: AtomicU32,
    max_box_size: AtomicU32,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

impl SharedConfig {
    /// Creates a shared record holding `config`.
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            confidence_threshold: AtomicU32::new(config.confidence_threshold.to_bits()),
            iou_threshold: AtomicU32::new(config.iou_threshold.to_bits()),
            min_box_size: AtomicU32::new(config.min_box_size.to_bits()),
            max_box_size: AtomicU32::new(config.max_box_size.to_bits()),
        }
    }

    /// Copies the current values into a plain config.
    pub fn snapshot(&self) -> DetectionConfig {
        DetectionConfig {
            confidence_threshold: load(&self.confidence_threshold),
            iou_threshold: load(&self.iou_threshold),
            min_box_size: load(&self.min_box_size),
            max_box_size: load(&self.max_box_size),
        }
    }

    /// Replaces every field.
    pub fn store(&self, config: DetectionConfig) {
        self.set_confidence_threshold(config.confidence_threshold);
        self.set_iou_threshold(config.iou_threshold);
        self.set_min_box_size(config.min_box_size);
        self.set_max_box_size(config.max_box_size);
    }

    /// Updates the confidence threshold seen by later snapshots.
    pub fn set_confidence_threshold(&self, value: f32) {
        store(&self.confidence_threshold, value);
    }

    /// Updates the NMS IoU threshold seen by later snapshots.
    pub fn set_iou_threshold(&self, value: f32) {
        store(&self.iou_threshold, value);
    }

    /// Updates the minimum model-space box size.
    pub fn set_min_box_size(&self, value: f32) {
        store(&self.min_box_size, value);
    }

    /// Updates the maximum model-space box size.
    pub fn set_max_box_size(&self, value: f32) {
        store(&self.max_box_size, value);
    }
}

#[inline]
fn load(cell: &AtomicU32) -> f32 {
    f32::from_bits(cell.load(Ordering::Relaxed))
}

#[inline]
fn store(cell: &AtomicU32, value: f32) {
    cell.store(value.to_bits(), Ordering::Relaxed);
}
