//! SIMD extraction kernel using the `wide` crate.
//!
//! The class-score scan is vectorised across anchors: for a channel-major
//! tensor each class channel is contiguous, so eight neighbouring anchors
//! are compared per `f32x8` load. The running maximum uses a strict
//! greater-than mask, matching the scalar tie-breaking. Anchor-major
//! tensors and the tail of the anchor range fall back to the scalar scan.

use crate::candidate::Candidate;
use crate::kernel::scalar::ExtractScalar;
use crate::kernel::{read_box, ExtractParams, Kernel};
use crate::tensor::{TensorLayout, TensorView, BOX_CHANNELS};
use std::ops::Range;
use wide::f32x8;

const LANES: usize = 8;

/// Load 8 f32 values into f32x8.
#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

/// Best class for `LANES` consecutive anchors starting at `anchor`.
///
/// Class indices are carried as `f32`, which is exact for every index a
/// `u16` can hold.
#[inline]
fn best_class_x8(
    tensor: TensorView<'_>,
    anchor: usize,
    num_classes: usize,
) -> ([f32; LANES], [f32; LANES]) {
    let mut best = f32x8::splat(f32::NEG_INFINITY);
    let mut best_idx = f32x8::splat(0.0);
    for class in 0..num_classes {
        let scores = load_f32x8(tensor.channel_run(BOX_CHANNELS + class, anchor, LANES));
        let better = scores.simd_gt(best);
        best = better.select(scores, best);
        best_idx = better.select(f32x8::splat(class as f32), best_idx);
    }
    (best_idx.to_array(), best.to_array())
}

/// Vectorised scan over blocks of eight anchors.
pub struct ExtractSimd;

impl Kernel for ExtractSimd {
    fn extract_range(
        tensor: TensorView<'_>,
        num_classes: usize,
        params: ExtractParams,
        anchors: Range<usize>,
        out: &mut Vec<Candidate>,
    ) {
        if tensor.layout() != TensorLayout::ChannelMajor {
            ExtractScalar::extract_range(tensor, num_classes, params, anchors, out);
            return;
        }

        let mut anchor = anchors.start;
        while anchor + LANES <= anchors.end {
            let (indices, scores) = best_class_x8(tensor, anchor, num_classes);
            for lane in 0..LANES {
                let bbox = read_box(tensor, anchor + lane);
                if !params.accepts_box(bbox.width, bbox.height) {
                    continue;
                }
                if !params.accepts_score(scores[lane]) {
                    continue;
                }
                out.push(Candidate {
                    bbox,
                    class_index: indices[lane] as u16,
                    score: scores[lane],
                });
            }
            anchor += LANES;
        }

        ExtractScalar::extract_range(tensor, num_classes, params, anchor..anchors.end, out);
    }
}
