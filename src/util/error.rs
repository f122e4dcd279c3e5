//! Error types for detpost.

use thiserror::Error;

/// Result alias for detpost operations.
pub type DetPostResult<T> = std::result::Result<T, DetPostError>;

/// Errors that can occur while decoding a detection tensor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetPostError {
    /// Tensor dimensions disagree with the declared shape or class count.
    #[error("shape mismatch ({context}): expected {expected}, got {got}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },
    /// A `(channel, anchor)` pair fell outside the tensor.
    #[error(
        "index out of range: channel {channel} / {channels}, anchor {anchor} / {anchors}"
    )]
    OutOfRange {
        channel: usize,
        anchor: usize,
        channels: usize,
        anchors: usize,
    },
    /// The inference collaborator failed to produce a tensor for this frame.
    #[error("model unavailable: {reason}")]
    ModelUnavailable { reason: String },
    /// Detection thresholds are outside their legal ranges.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },
    /// The geometry context cannot describe a valid transform.
    #[error("invalid geometry: {reason}")]
    InvalidGeometry { reason: &'static str },
    /// Reading a tensor dump failed.
    #[error("tensor io failed: {reason}")]
    TensorIo { reason: String },
}
