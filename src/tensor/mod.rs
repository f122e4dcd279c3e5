//! Zero-copy views over detection-head output tensors.
//!
//! A detection head emits a dense `f32` buffer of shape `(1, 4 + C, N)`:
//! four box channels (`cx, cy, w, h`) followed by `C` class-score channels,
//! for each of `N` anchors. `TensorView` borrows that buffer and owns all of
//! the index arithmetic so the rest of the pipeline addresses values by
//! `(channel, anchor)` only. Some exports transpose the head to
//! `(1, N, 4 + C)`; `TensorLayout` selects between the two packings.

use crate::util::{DetPostError, DetPostResult};

#[cfg(feature = "tensor-io")]
pub mod io;

/// Number of box channels (`cx, cy, w, h`) preceding the class scores.
pub const BOX_CHANNELS: usize = 4;

/// Memory order of the `(channel, anchor)` grid inside the flat buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TensorLayout {
    /// `(1, 4 + C, N)`: each channel is a contiguous run of `N` values.
    #[default]
    ChannelMajor,
    /// `(1, N, 4 + C)`: each anchor is a contiguous run of `4 + C` values.
    AnchorMajor,
}

/// Borrowed read-only view of a detection tensor.
#[derive(Copy, Clone, Debug)]
pub struct TensorView<'a> {
    data: &'a [f32],
    channels: usize,
    anchors: usize,
    layout: TensorLayout,
}

impl<'a> TensorView<'a> {
    /// Creates a channel-major view over `channels * anchors` values.
    pub fn new(data: &'a [f32], channels: usize, anchors: usize) -> DetPostResult<Self> {
        Self::with_layout(data, channels, anchors, TensorLayout::ChannelMajor)
    }

    /// Creates a view with an explicit memory layout.
    pub fn with_layout(
        data: &'a [f32],
        channels: usize,
        anchors: usize,
        layout: TensorLayout,
    ) -> DetPostResult<Self> {
        if channels < BOX_CHANNELS {
            return Err(DetPostError::ShapeMismatch {
                context: "box channels",
                expected: BOX_CHANNELS,
                got: channels,
            });
        }
        let needed = channels
            .checked_mul(anchors)
            .ok_or(DetPostError::ShapeMismatch {
                context: "tensor length",
                expected: usize::MAX,
                got: data.len(),
            })?;
        if data.len() != needed {
            return Err(DetPostError::ShapeMismatch {
                context: "tensor length",
                expected: needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            channels,
            anchors,
            layout,
        })
    }

    /// Creates a view from an engine-reported shape.
    ///
    /// Accepts `[1, 4 + C, N]` for `ChannelMajor` or `[1, N, 4 + C]` for
    /// `AnchorMajor`; a leading batch dimension other than 1 is rejected.
    pub fn from_shape(
        data: &'a [f32],
        shape: &[usize],
        layout: TensorLayout,
    ) -> DetPostResult<Self> {
        let [batch, d1, d2] = shape else {
            return Err(DetPostError::ShapeMismatch {
                context: "tensor rank",
                expected: 3,
                got: shape.len(),
            });
        };
        if *batch != 1 {
            return Err(DetPostError::ShapeMismatch {
                context: "batch size",
                expected: 1,
                got: *batch,
            });
        }
        let (channels, anchors) = match layout {
            TensorLayout::ChannelMajor => (*d1, *d2),
            TensorLayout::AnchorMajor => (*d2, *d1),
        };
        Self::with_layout(data, channels, anchors, layout)
    }

    /// Returns the number of channels (`4 + C`).
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the number of class-score channels (`C`).
    pub fn num_classes(&self) -> usize {
        self.channels - BOX_CHANNELS
    }

    /// Returns the number of anchors (`N`).
    pub fn anchors(&self) -> usize {
        self.anchors
    }

    /// Returns the memory layout of the backing buffer.
    pub fn layout(&self) -> TensorLayout {
        self.layout
    }

    /// Returns the backing slice.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Returns the value at `(channel, anchor)`.
    pub fn get(&self, channel: usize, anchor: usize) -> DetPostResult<f32> {
        if channel >= self.channels || anchor >= self.anchors {
            return Err(DetPostError::OutOfRange {
                channel,
                anchor,
                channels: self.channels,
                anchors: self.anchors,
            });
        }
        Ok(self.at(channel, anchor))
    }

    /// Returns the contiguous run of `N` values for `channel`.
    ///
    /// Only channel-major tensors store channels contiguously; anchor-major
    /// views return `None`.
    pub fn channel(&self, channel: usize) -> Option<&'a [f32]> {
        if self.layout != TensorLayout::ChannelMajor || channel >= self.channels {
            return None;
        }
        let start = channel * self.anchors;
        self.data.get(start..start + self.anchors)
    }

    /// Unchecked-by-contract accessor for the hot scan loops.
    ///
    /// Callers validate `channel < channels` and `anchor < anchors` once up
    /// front; an index outside the buffer is a bug and panics.
    #[inline(always)]
    pub(crate) fn at(&self, channel: usize, anchor: usize) -> f32 {
        debug_assert!(channel < self.channels && anchor < self.anchors);
        let idx = match self.layout {
            TensorLayout::ChannelMajor => channel * self.anchors + anchor,
            TensorLayout::AnchorMajor => anchor * self.channels + channel,
        };
        self.data[idx]
    }

    /// Returns `len` consecutive anchors of a channel-major `channel`.
    ///
    /// Same contract as [`TensorView::at`]; used by the vectorised scan.
    #[cfg(feature = "simd")]
    #[inline(always)]
    pub(crate) fn channel_run(&self, channel: usize, anchor: usize, len: usize) -> &'a [f32] {
        debug_assert!(self.layout == TensorLayout::ChannelMajor);
        debug_assert!(channel < self.channels && anchor + len <= self.anchors);
        let start = channel * self.anchors + anchor;
        &self.data[start..start + len]
    }
}

/// Owned tensor buffer with its shape.
#[derive(Clone, Debug)]
pub struct OwnedTensor {
    data: Vec<f32>,
    channels: usize,
    anchors: usize,
    layout: TensorLayout,
}

impl OwnedTensor {
    /// Creates a channel-major owned tensor.
    pub fn new(data: Vec<f32>, channels: usize, anchors: usize) -> DetPostResult<Self> {
        Self::with_layout(data, channels, anchors, TensorLayout::ChannelMajor)
    }

    /// Creates an owned tensor with an explicit layout.
    pub fn with_layout(
        data: Vec<f32>,
        channels: usize,
        anchors: usize,
        layout: TensorLayout,
    ) -> DetPostResult<Self> {
        TensorView::with_layout(&data, channels, anchors, layout)?;
        Ok(Self {
            data,
            channels,
            anchors,
            layout,
        })
    }

    /// Returns a borrowed view of the tensor.
    pub fn view(&self) -> TensorView<'_> {
        TensorView {
            data: &self.data,
            channels: self.channels,
            anchors: self.anchors,
            layout: self.layout,
        }
    }

    /// Returns the raw values.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the raw values mutably, e.g. to activate logits in place.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Returns the number of channels (`4 + C`).
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the number of anchors (`N`).
    pub fn anchors(&self) -> usize {
        self.anchors
    }

    /// Consumes the tensor and returns its backing buffer.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::{OwnedTensor, TensorLayout, TensorView};

    #[test]
    fn channel_major_indexing_walks_anchors_within_a_channel() {
        let data: Vec<f32> = (0..15).map(|v| v as f32).collect();
        let view = TensorView::new(&data, 5, 3).unwrap();
        assert_eq!(view.get(0, 0).unwrap(), 0.0);
        assert_eq!(view.get(0, 2).unwrap(), 2.0);
        assert_eq!(view.get(4, 1).unwrap(), 13.0);
        assert_eq!(view.channel(1).unwrap(), &[3.0, 4.0, 5.0]);
        assert_eq!(view.num_classes(), 1);
    }

    #[test]
    fn anchor_major_indexing_matches_transposed_layout() {
        let data: Vec<f32> = (0..15).map(|v| v as f32).collect();
        let view = TensorView::with_layout(&data, 5, 3, TensorLayout::AnchorMajor).unwrap();
        assert_eq!(view.get(0, 1).unwrap(), 5.0);
        assert_eq!(view.get(4, 2).unwrap(), 14.0);
        assert!(view.channel(0).is_none());
    }

    #[test]
    fn owned_tensor_view_shares_shape() {
        let owned = OwnedTensor::new(vec![0.0; 12], 6, 2).unwrap();
        let view = owned.view();
        assert_eq!(view.channels(), 6);
        assert_eq!(view.anchors(), 2);
        assert_eq!(view.as_slice().len(), 12);
    }
}
