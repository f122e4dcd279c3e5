//! Loading raw tensor dumps from disk.
//!
//! Available when the `tensor-io` feature is enabled. A dump is the tensor's
//! flat `f32` buffer written in native byte order with no header, which is
//! what `bytemuck::cast_slice(tensor.as_slice())` produces on the writer
//! side.

use crate::tensor::{OwnedTensor, TensorLayout};
use crate::util::{DetPostError, DetPostResult};
use std::path::Path;

const F32_BYTES: usize = std::mem::size_of::<f32>();

/// Decodes a raw `f32` byte buffer into an owned tensor.
pub fn tensor_from_bytes(
    bytes: &[u8],
    channels: usize,
    anchors: usize,
    layout: TensorLayout,
) -> DetPostResult<OwnedTensor> {
    if bytes.len() % F32_BYTES != 0 {
        return Err(DetPostError::TensorIo {
            reason: format!(
                "dump length {} is not a multiple of {F32_BYTES} bytes",
                bytes.len()
            ),
        });
    }
    // Copy into an f32 buffer so the source alignment does not matter.
    let mut data = vec![0.0f32; bytes.len() / F32_BYTES];
    bytemuck::cast_slice_mut::<f32, u8>(&mut data).copy_from_slice(bytes);
    OwnedTensor::with_layout(data, channels, anchors, layout)
}

/// Loads a raw tensor dump from disk.
pub fn load_tensor<P: AsRef<Path>>(
    path: P,
    channels: usize,
    anchors: usize,
    layout: TensorLayout,
) -> DetPostResult<OwnedTensor> {
    let bytes = std::fs::read(path.as_ref()).map_err(|err| DetPostError::TensorIo {
        reason: format!("{}: {err}", path.as_ref().display()),
    })?;
    tensor_from_bytes(&bytes, channels, anchors, layout)
}
