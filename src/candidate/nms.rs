//! Greedy IoU non-maximum suppression.

use crate::candidate::{sort_candidates_desc, Candidate};
use crate::geometry::Rect;

/// Grouping used when deciding which boxes may suppress each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NmsMode {
    /// Any kept box suppresses overlapping boxes of every class.
    #[default]
    ClassAgnostic,
    /// Boxes only suppress boxes of the same class.
    PerClass,
}

/// Applies class-agnostic greedy NMS.
///
/// Candidates are sorted by descending score (stable, so equal scores keep
/// anchor order) and kept unless their IoU with an already kept box is
/// `>= iou_threshold`. The result is in descending score order.
pub fn suppress(candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    suppress_with_mode(candidates, iou_threshold, NmsMode::ClassAgnostic)
}

/// Applies greedy NMS with an explicit grouping mode.
pub fn suppress_with_mode(
    mut candidates: Vec<Candidate>,
    iou_threshold: f32,
    mode: NmsMode,
) -> Vec<Candidate> {
    sort_candidates_desc(&mut candidates);

    let mut kept: Vec<Candidate> = Vec::new();
    let mut kept_rects: Vec<Rect> = Vec::new();

    'outer: for candidate in candidates {
        let rect = candidate.bbox.to_rect();
        for (kept_candidate, kept_rect) in kept.iter().zip(kept_rects.iter()) {
            if mode == NmsMode::PerClass && kept_candidate.class_index != candidate.class_index {
                continue;
            }
            if rect.iou(kept_rect) >= iou_threshold {
                continue 'outer;
            }
        }
        kept.push(candidate);
        kept_rects.push(rect);
    }

    kept
}
