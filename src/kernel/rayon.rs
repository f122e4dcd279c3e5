//! Rayon-parallel extraction (feature-gated).
//!
//! The anchor range is split into fixed-size chunks scanned on the rayon
//! pool. Chunk results are concatenated in chunk order, so the output is
//! identical to a sequential scan with the same kernel.

use crate::candidate::Candidate;
use crate::kernel::{check_class_channels, ExtractParams, Kernel};
use crate::tensor::TensorView;
use crate::trace::{trace_event, trace_span};
use crate::util::DetPostResult;
use rayon::prelude::*;

/// Anchors scanned per rayon task.
const CHUNK_ANCHORS: usize = 1024;

/// Chunk-parallel extraction with kernel `K`.
pub fn extract_par<K: Kernel>(
    tensor: TensorView<'_>,
    num_classes: usize,
    params: ExtractParams,
) -> DetPostResult<Vec<Candidate>> {
    check_class_channels(tensor, num_classes)?;

    let anchors = tensor.anchors();
    let _span = trace_span!(
        "extract",
        anchors = anchors,
        classes = num_classes,
        parallel = true
    )
    .entered();

    let chunks: Vec<Vec<Candidate>> = (0..anchors.div_ceil(CHUNK_ANCHORS))
        .into_par_iter()
        .map(|chunk| {
            let start = chunk * CHUNK_ANCHORS;
            let end = (start + CHUNK_ANCHORS).min(anchors);
            let mut out = Vec::new();
            K::extract_range(tensor, num_classes, params, start..end, &mut out);
            out
        })
        .collect();

    let out: Vec<Candidate> = chunks.into_iter().flatten().collect();
    trace_event!("extract_candidates", count = out.len());
    Ok(out)
}
