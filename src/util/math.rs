//! Scalar helpers shared by the extraction and mapping stages.

/// Logistic sigmoid.
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Applies [`sigmoid`] to every element of `values`.
///
/// Use this on class-score channels of models that emit raw logits before
/// handing the tensor to the pipeline.
pub fn sigmoid_in_place(values: &mut [f32]) {
    for v in values.iter_mut() {
        *v = sigmoid(*v);
    }
}

/// Converts a center-form box to corner coordinates `(x1, y1, x2, y2)`.
#[inline]
pub(crate) fn cxcywh_to_xyxy(cx: f32, cy: f32, w: f32, h: f32) -> (f32, f32, f32, f32) {
    let half_w = w / 2.0;
    let half_h = h / 2.0;
    (cx - half_w, cy - half_h, cx + half_w, cy + half_h)
}

#[cfg(test)]
mod tests {
    use super::{cxcywh_to_xyxy, sigmoid, sigmoid_in_place};

    #[test]
    fn sigmoid_is_centered_at_half() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
    }

    #[test]
    fn sigmoid_in_place_maps_every_value() {
        let mut values = [0.0f32, 10.0, -10.0];
        sigmoid_in_place(&mut values);
        assert!((values[0] - 0.5).abs() < 1e-6);
        assert!(values[1] > 0.99);
        assert!(values[2] < 0.01);
    }

    #[test]
    fn cxcywh_to_xyxy_matches_corners() {
        let (x1, y1, x2, y2) = cxcywh_to_xyxy(0.5, 0.5, 0.4, 0.2);
        assert!((x1 - 0.3).abs() < 1e-6);
        assert!((y1 - 0.4).abs() < 1e-6);
        assert!((x2 - 0.7).abs() < 1e-6);
        assert!((y2 - 0.6).abs() < 1e-6);
    }
}
