//! Low-level building blocks for custom decoding pipelines.
//!
//! These expose the individual stages behind `DetectionPipeline` for callers
//! that need to interleave their own steps, e.g. tracking between NMS and
//! mapping. Most users should prefer `DetectionPipeline::run`.

pub use crate::candidate::nms::{suppress, suppress_with_mode, NmsMode};
pub use crate::candidate::Candidate;
pub use crate::kernel::scalar::ExtractScalar;
pub use crate::kernel::{extract, DefaultKernel, ExtractParams, Kernel};

#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::extract_par;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::ExtractSimd;
