//! Box representations and overlap measures.
//!
//! Model-space boxes come out of the tensor in center form (`CenterBox`);
//! display-space boxes are handed to callers in top-left form (`Rect`).

use crate::util::math::cxcywh_to_xyxy;

pub mod mapper;

/// Center-form box: center `(cx, cy)` and size `(width, height)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CenterBox {
    pub cx: f32,
    pub cy: f32,
    pub width: f32,
    pub height: f32,
}

impl CenterBox {
    /// Creates a center-form box.
    pub fn new(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self {
            cx,
            cy,
            width,
            height,
        }
    }

    /// Returns the equivalent top-left-form rectangle.
    pub fn to_rect(self) -> Rect {
        let (x1, y1, _, _) = cxcywh_to_xyxy(self.cx, self.cy, self.width, self.height);
        Rect::new(x1, y1, self.width, self.height)
    }

    /// Returns `width * height`.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Top-left-form rectangle: origin `(x, y)` and size `(width, height)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Creates a top-left-form rectangle.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the right edge.
    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the bottom edge.
    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    /// Returns `width * height`.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Returns the center-form equivalent.
    pub fn to_center(self) -> CenterBox {
        CenterBox::new(
            self.x + self.width / 2.0,
            self.y + self.height / 2.0,
            self.width,
            self.height,
        )
    }

    /// Returns the area shared with `other`, zero when disjoint.
    pub fn intersection_area(&self, other: &Rect) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.max_x().min(other.max_x());
        let y2 = self.max_y().min(other.max_y());
        (x2 - x1).max(0.0) * (y2 - y1).max(0.0)
    }

    /// Intersection over union with `other`.
    ///
    /// Returns 0 when the boxes are disjoint or either area is not positive.
    pub fn iou(&self, other: &Rect) -> f32 {
        let area_a = self.area();
        let area_b = other.area();
        if area_a <= 0.0 || area_b <= 0.0 {
            return 0.0;
        }
        let inter = self.intersection_area(other);
        if inter <= 0.0 {
            return 0.0;
        }
        inter / (area_a + area_b - inter)
    }

    /// Expresses the rectangle as fractions of a `width x height` frame.
    pub fn normalized(&self, width: f32, height: f32) -> Rect {
        Rect::new(
            self.x / width,
            self.y / height,
            self.width / width,
            self.height / height,
        )
    }

    /// Clips the rectangle to `[0, width] x [0, height]`.
    ///
    /// A rectangle entirely outside the frame collapses to zero size on the
    /// nearest edge.
    pub fn clamped(&self, width: f32, height: f32) -> Rect {
        let x1 = self.x.clamp(0.0, width);
        let y1 = self.y.clamp(0.0, height);
        let x2 = self.max_x().clamp(0.0, width);
        let y2 = self.max_y().clamp(0.0, height);
        Rect::new(x1, y1, (x2 - x1).max(0.0), (y2 - y1).max(0.0))
    }
}

impl From<CenterBox> for Rect {
    fn from(value: CenterBox) -> Self {
        value.to_rect()
    }
}

#[cfg(test)]
mod tests {
    use super::{CenterBox, Rect};

    #[test]
    fn center_box_converts_to_top_left() {
        let rect = CenterBox::new(50.0, 40.0, 20.0, 10.0).to_rect();
        assert_eq!(rect, Rect::new(40.0, 35.0, 20.0, 10.0));
        assert_eq!(rect.to_center(), CenterBox::new(50.0, 40.0, 20.0, 10.0));
    }

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 0.0, 10.0, 10.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn iou_guards_degenerate_area() {
        let a = Rect::new(0.0, 0.0, 0.0, 10.0);
        let b = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(a.iou(&b), 0.0);
        assert_eq!(b.iou(&a), 0.0);
    }

    #[test]
    fn iou_of_half_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 0.0, 10.0, 10.0);
        // 50 / (100 + 100 - 50)
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn clamped_clips_to_frame() {
        let rect = Rect::new(-5.0, 90.0, 20.0, 20.0).clamped(100.0, 100.0);
        assert_eq!(rect, Rect::new(0.0, 90.0, 15.0, 10.0));
    }

    #[test]
    fn normalized_divides_by_frame() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0).normalized(100.0, 200.0);
        assert_eq!(rect, Rect::new(0.1, 0.1, 0.3, 0.2));
    }
}
