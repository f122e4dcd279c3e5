//! detpost decodes object-detection head outputs into labeled screen boxes.
//!
//! The pipeline reads a dense `(1, 4 + C, N)` tensor, keeps anchors whose box
//! and best class score pass the configured filters, applies greedy
//! class-agnostic NMS and maps the survivors from the square model input back
//! to the destination frame, undoing a center crop or letterbox. Optional
//! features add rayon-parallel and SIMD extraction kernels.

mod candidate;
pub mod geometry;
pub mod kernel;
pub mod labels;
pub mod lowlevel;
pub mod pipeline;
pub mod tensor;
mod trace;
pub mod util;

pub use geometry::mapper::{AxisConvention, FitPolicy, GeometryContext};
pub use geometry::{CenterBox, Rect};
pub use labels::{LabelTable, COCO_LABELS, UNKNOWN_LABEL};
pub use pipeline::{
    Detection, DetectionConfig, DetectionPipeline, FrameGate, FrameGuard, SharedConfig,
};
pub use tensor::{OwnedTensor, TensorLayout, TensorView};
pub use util::{sigmoid, sigmoid_in_place, DetPostError, DetPostResult};

pub use candidate::nms::NmsMode;

#[cfg(feature = "tensor-io")]
pub use tensor::io;
