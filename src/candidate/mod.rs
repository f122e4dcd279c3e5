//! Scored candidates and their pruning.
//!
//! Candidates live only between extraction and suppression; the pipeline
//! never hands them to callers.

use crate::geometry::CenterBox;
use std::cmp::Ordering;

pub(crate) mod nms;

/// One anchor that survived extraction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Model-space box in center form.
    pub bbox: CenterBox,
    /// Index of the best-scoring class.
    pub class_index: u16,
    /// Raw score of that class.
    pub score: f32,
}

fn candidate_cmp_desc(a: &Candidate, b: &Candidate) -> Ordering {
    b.score.total_cmp(&a.score)
}

/// Sorts candidates by descending score; equal scores keep their order.
pub(crate) fn sort_candidates_desc(candidates: &mut [Candidate]) {
    candidates.sort_by(candidate_cmp_desc);
}
