//! Candidate extraction kernels.
//!
//! A kernel walks the anchors of a detection tensor, decodes each box,
//! rejects invalid or out-of-size boxes, picks the best class and keeps the
//! anchor when its score clears the confidence threshold. Kernels differ
//! only in how the class-score scan is executed; their output is identical.

use crate::candidate::Candidate;
use crate::geometry::CenterBox;
use crate::tensor::{TensorView, BOX_CHANNELS};
use crate::trace::{trace_event, trace_span};
use crate::util::{DetPostError, DetPostResult};
use std::ops::Range;

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Kernel used by the pipeline: SIMD when available, scalar otherwise.
#[cfg(not(feature = "simd"))]
pub type DefaultKernel = scalar::ExtractScalar;
#[cfg(feature = "simd")]
pub type DefaultKernel = simd::ExtractSimd;

/// Filter thresholds snapshotted for one extraction pass.
///
/// Sizes are in model-space pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtractParams {
    /// Scores must be strictly greater than this value.
    pub confidence_threshold: f32,
    /// Minimum box width and height (inclusive).
    pub min_box_size: f32,
    /// Maximum box width and height (inclusive).
    pub max_box_size: f32,
}

impl ExtractParams {
    /// Returns whether a decoded box is valid and within the size bounds.
    #[inline]
    pub fn accepts_box(&self, width: f32, height: f32) -> bool {
        if !(width > 0.0 && height > 0.0) {
            return false;
        }
        width >= self.min_box_size
            && height >= self.min_box_size
            && width <= self.max_box_size
            && height <= self.max_box_size
    }

    /// Returns whether a best-class score clears the confidence threshold.
    #[inline]
    pub fn accepts_score(&self, score: f32) -> bool {
        score > self.confidence_threshold
    }
}

/// Kernel trait for the anchor scan.
pub trait Kernel {
    /// Scans `anchors` and appends accepted candidates to `out` in anchor
    /// order.
    ///
    /// The caller has already checked `4 + num_classes <= tensor.channels()`
    /// and that `anchors` lies within the tensor.
    fn extract_range(
        tensor: TensorView<'_>,
        num_classes: usize,
        params: ExtractParams,
        anchors: Range<usize>,
        out: &mut Vec<Candidate>,
    );

    /// Scans every anchor and returns the accepted candidates in anchor
    /// order.
    fn extract(
        tensor: TensorView<'_>,
        num_classes: usize,
        params: ExtractParams,
    ) -> DetPostResult<Vec<Candidate>> {
        check_class_channels(tensor, num_classes)?;
        let _span = trace_span!("extract", anchors = tensor.anchors(), classes = num_classes)
            .entered();
        let mut out = Vec::new();
        Self::extract_range(tensor, num_classes, params, 0..tensor.anchors(), &mut out);
        trace_event!("extract_candidates", count = out.len());
        Ok(out)
    }
}

/// Extracts candidates with [`DefaultKernel`].
pub fn extract(
    tensor: TensorView<'_>,
    num_classes: usize,
    params: ExtractParams,
) -> DetPostResult<Vec<Candidate>> {
    <DefaultKernel as Kernel>::extract(tensor, num_classes, params)
}

/// Ensures the class-score channels `4..4 + num_classes` exist and that
/// every class index fits in a `u16`.
pub(crate) fn check_class_channels(tensor: TensorView<'_>, num_classes: usize) -> DetPostResult<()> {
    let needed = BOX_CHANNELS.saturating_add(num_classes);
    if needed > tensor.channels() {
        return Err(DetPostError::ShapeMismatch {
            context: "class channels",
            expected: needed,
            got: tensor.channels(),
        });
    }
    if num_classes > usize::from(u16::MAX) + 1 {
        return Err(DetPostError::ShapeMismatch {
            context: "class count",
            expected: usize::from(u16::MAX) + 1,
            got: num_classes,
        });
    }
    Ok(())
}

/// Reads the center-form box of `anchor` from channels 0..4.
#[inline(always)]
pub(crate) fn read_box(tensor: TensorView<'_>, anchor: usize) -> CenterBox {
    CenterBox::new(
        tensor.at(0, anchor),
        tensor.at(1, anchor),
        tensor.at(2, anchor),
        tensor.at(3, anchor),
    )
}
