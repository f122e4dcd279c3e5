//! Scalar extraction kernel.

use crate::candidate::Candidate;
use crate::kernel::{read_box, ExtractParams, Kernel};
use crate::tensor::{TensorView, BOX_CHANNELS};
use std::ops::Range;

/// Best class of one anchor as `(class_index, score)`.
///
/// The comparison is strict, so the lowest class index wins ties. With no
/// classes (or only NaN scores) the score stays at negative infinity.
#[inline]
pub(crate) fn best_class(tensor: TensorView<'_>, anchor: usize, num_classes: usize) -> (u16, f32) {
    let mut best_score = f32::NEG_INFINITY;
    let mut best_idx = 0u16;
    for class in 0..num_classes {
        let score = tensor.at(BOX_CHANNELS + class, anchor);
        if score > best_score {
            best_score = score;
            best_idx = class as u16;
        }
    }
    (best_idx, best_score)
}

/// Straightforward per-anchor scan.
pub struct ExtractScalar;

impl Kernel for ExtractScalar {
    fn extract_range(
        tensor: TensorView<'_>,
        num_classes: usize,
        params: ExtractParams,
        anchors: Range<usize>,
        out: &mut Vec<Candidate>,
    ) {
        for anchor in anchors {
            let bbox = read_box(tensor, anchor);
            if !params.accepts_box(bbox.width, bbox.height) {
                continue;
            }
            let (class_index, score) = best_class(tensor, anchor, num_classes);
            if !params.accepts_score(score) {
                continue;
            }
            out.push(Candidate {
                bbox,
                class_index,
                score,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{best_class, ExtractScalar};
    use crate::kernel::{ExtractParams, Kernel};
    use crate::tensor::TensorView;

    fn params() -> ExtractParams {
        ExtractParams {
            confidence_threshold: 0.25,
            min_box_size: 10.0,
            max_box_size: 600.0,
        }
    }

    #[test]
    fn best_class_prefers_lowest_index_on_ties() {
        // 4 box channels + 3 classes, one anchor.
        let data = [0.0, 0.0, 20.0, 20.0, 0.7, 0.7, 0.1];
        let view = TensorView::new(&data, 7, 1).unwrap();
        assert_eq!(best_class(view, 0, 3), (0, 0.7));
    }

    #[test]
    fn best_class_without_classes_is_negative_infinity() {
        let data = [0.0, 0.0, 20.0, 20.0];
        let view = TensorView::new(&data, 4, 1).unwrap();
        let (_, score) = best_class(view, 0, 0);
        assert_eq!(score, f32::NEG_INFINITY);
    }

    #[test]
    fn rejects_box_and_score_filters() {
        // Channel-major, 4 anchors, 1 class.
        #[rustfmt::skip]
        let data = [
            // cx
            50.0, 50.0, 50.0, 50.0,
            // cy
            50.0, 50.0, 50.0, 50.0,
            // w
            20.0, 0.0, 5.0, 20.0,
            // h
            20.0, 20.0, 20.0, 20.0,
            // class 0
            0.9, 0.9, 0.9, 0.25,
        ];
        let view = TensorView::new(&data, 5, 4).unwrap();
        let out = ExtractScalar::extract(view, 1, params()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].score, 0.9);
        assert_eq!(out[0].bbox.width, 20.0);
    }
}
