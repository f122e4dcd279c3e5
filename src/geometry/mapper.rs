//! Model-space to display-space coordinate mapping.
//!
//! The model always sees a `model_dimension x model_dimension` square. How a
//! frame was squeezed into that square (center crop or letterbox) decides
//! the inverse transform, so the fit policy travels with the geometry
//! instead of being inferred from call sites.

use crate::geometry::{CenterBox, Rect};
use crate::util::{DetPostError, DetPostResult};

/// How the source frame was fitted into the square model input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FitPolicy {
    /// The frame was center-cropped to a square (aspect fill).
    AspectFillCrop,
    /// The frame was scaled to fit and padded (aspect fit, letterbox).
    #[default]
    AspectFitLetterbox,
}

/// Order of the spatial channels in the model export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AxisConvention {
    /// Channels hold `(cx, cy, w, h)`.
    #[default]
    Xy,
    /// Channels hold `(cy, cx, h, w)` with the vertical axis flipped.
    YxFlipped,
}

/// Geometry of the frame that was submitted for inference.
///
/// Must describe what was actually fed to the model; a mismatch produces
/// wrong coordinates, not an error.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometryContext {
    /// Side of the square model input, in pixels.
    pub model_dimension: f32,
    /// Width of the destination frame or display, in pixels.
    pub dest_width: f32,
    /// Height of the destination frame or display, in pixels.
    pub dest_height: f32,
    /// Fit policy used before inference.
    pub fit_policy: FitPolicy,
    /// Spatial channel order of the model export.
    pub axis_convention: AxisConvention,
}

impl Default for GeometryContext {
    fn default() -> Self {
        Self {
            model_dimension: 640.0,
            dest_width: 640.0,
            dest_height: 640.0,
            fit_policy: FitPolicy::default(),
            axis_convention: AxisConvention::default(),
        }
    }
}

impl GeometryContext {
    /// Creates a context with the default `Xy` axis convention.
    pub fn new(
        model_dimension: f32,
        dest_width: f32,
        dest_height: f32,
        fit_policy: FitPolicy,
    ) -> Self {
        Self {
            model_dimension,
            dest_width,
            dest_height,
            fit_policy,
            axis_convention: AxisConvention::Xy,
        }
    }

    /// Returns a copy with a different axis convention.
    pub fn with_axis_convention(mut self, axis_convention: AxisConvention) -> Self {
        self.axis_convention = axis_convention;
        self
    }

    /// Validates that every dimension is finite and positive.
    pub fn validate(&self) -> DetPostResult<()> {
        let dims = [self.model_dimension, self.dest_width, self.dest_height];
        if dims.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(DetPostError::InvalidGeometry {
                reason: "model and destination dimensions must be positive",
            });
        }
        Ok(())
    }

    /// Maps a model-space center-form box to a display-space rectangle.
    ///
    /// Pure arithmetic: boxes are neither dropped nor clamped, so results may
    /// extend slightly past the frame edges.
    pub fn map_to_display(&self, bbox: CenterBox) -> Rect {
        let bbox = self.to_xy(bbox);
        match self.fit_policy {
            FitPolicy::AspectFillCrop => {
                let crop = self.dest_width.min(self.dest_height);
                let scale = crop / self.model_dimension;
                let offset_x = (self.dest_width - crop) / 2.0;
                let offset_y = (self.dest_height - crop) / 2.0;
                self.project(bbox, scale, offset_x, offset_y)
            }
            FitPolicy::AspectFitLetterbox => {
                let scale = self.dest_width.max(self.dest_height) / self.model_dimension;
                let scaled_side = self.model_dimension * scale;
                let pad_x = (self.dest_width - scaled_side).abs() / 2.0;
                let pad_y = (self.dest_height - scaled_side).abs() / 2.0;
                self.project(bbox, scale, -pad_x, -pad_y)
            }
        }
    }

    /// Undoes a `YxFlipped` export so the box reads `(cx, cy, w, h)`.
    fn to_xy(&self, bbox: CenterBox) -> CenterBox {
        match self.axis_convention {
            AxisConvention::Xy => bbox,
            AxisConvention::YxFlipped => CenterBox::new(
                bbox.cy,
                self.model_dimension - bbox.cx,
                bbox.height,
                bbox.width,
            ),
        }
    }

    fn project(&self, bbox: CenterBox, scale: f32, offset_x: f32, offset_y: f32) -> Rect {
        let scaled = CenterBox::new(
            bbox.cx * scale + offset_x,
            bbox.cy * scale + offset_y,
            bbox.width * scale,
            bbox.height * scale,
        );
        scaled.to_rect()
    }
}
