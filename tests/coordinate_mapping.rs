use detpost::{AxisConvention, CenterBox, FitPolicy, GeometryContext, Rect};

fn assert_rect_close(got: Rect, expected: Rect) {
    let tol = 1e-3;
    assert!(
        (got.x - expected.x).abs() < tol
            && (got.y - expected.y).abs() < tol
            && (got.width - expected.width).abs() < tol
            && (got.height - expected.height).abs() < tol,
        "expected {expected:?}, got {got:?}"
    );
}

#[test]
fn letterbox_portrait_phone_frame() {
    // scale = 844 / 640 = 1.31875, scaled side = 844, pad_x = (844 - 390) / 2 = 227.
    // Center (320, 320) -> (422 - 227, 422) = (195, 422); size 64 * 1.31875 = 84.4.
    let ctx = GeometryContext::new(640.0, 390.0, 844.0, FitPolicy::AspectFitLetterbox);
    let rect = ctx.map_to_display(CenterBox::new(320.0, 320.0, 64.0, 64.0));
    assert_rect_close(rect, Rect::new(152.8, 379.8, 84.4, 84.4));

    // The model center lands on the frame center.
    let center = rect.to_center();
    assert!((center.cx - 195.0).abs() < 1e-3);
    assert!((center.cy - 422.0).abs() < 1e-3);
}

#[test]
fn letterbox_landscape_frame_pads_vertically() {
    // scale = 1280 / 640 = 2, pad_y = (1280 - 720) / 2 = 280.
    let ctx = GeometryContext::new(640.0, 1280.0, 720.0, FitPolicy::AspectFitLetterbox);
    let rect = ctx.map_to_display(CenterBox::new(100.0, 320.0, 50.0, 30.0));
    // center (200, 640 - 280 = 360), size (100, 60)
    assert_rect_close(rect, Rect::new(150.0, 330.0, 100.0, 60.0));
}

#[test]
fn fill_crop_portrait_phone_frame() {
    // crop = 390, scale = 390 / 640 = 0.609375, offset_y = (844 - 390) / 2 = 227.
    // Center (320, 320) -> (195, 195 + 227 = 422); size 64 * 0.609375 = 39.
    let ctx = GeometryContext::new(640.0, 390.0, 844.0, FitPolicy::AspectFillCrop);
    let rect = ctx.map_to_display(CenterBox::new(320.0, 320.0, 64.0, 64.0));
    assert_rect_close(rect, Rect::new(175.5, 402.5, 39.0, 39.0));
}

#[test]
fn fill_crop_landscape_frame_offsets_horizontally() {
    // crop = 480, scale = 0.75, offset_x = (640 - 480) / 2 = 80.
    let ctx = GeometryContext::new(640.0, 640.0, 480.0, FitPolicy::AspectFillCrop);
    let rect = ctx.map_to_display(CenterBox::new(0.0, 0.0, 40.0, 40.0));
    assert_rect_close(rect, Rect::new(65.0, -15.0, 30.0, 30.0));
}

#[test]
fn boxes_past_the_edge_are_not_clamped() {
    let ctx = GeometryContext::new(640.0, 640.0, 640.0, FitPolicy::AspectFitLetterbox);
    let rect = ctx.map_to_display(CenterBox::new(630.0, 5.0, 40.0, 40.0));
    assert_rect_close(rect, Rect::new(610.0, -15.0, 40.0, 40.0));
    assert!(rect.max_x() > 640.0);
}

#[test]
fn yx_flipped_export_matches_xy_export_of_the_same_object() {
    let ctx = GeometryContext::new(640.0, 390.0, 844.0, FitPolicy::AspectFitLetterbox);
    let xy = ctx.map_to_display(CenterBox::new(200.0, 500.0, 60.0, 30.0));

    // Same object from an export that emits (y, x, h, w) with y measured
    // from the bottom edge.
    let flipped_ctx = ctx.with_axis_convention(AxisConvention::YxFlipped);
    let flipped = flipped_ctx.map_to_display(CenterBox::new(640.0 - 500.0, 200.0, 30.0, 60.0));
    assert_rect_close(flipped, xy);
}

#[test]
fn mapping_preserves_overlap_ordering() {
    let ctx = GeometryContext::new(640.0, 390.0, 844.0, FitPolicy::AspectFitLetterbox);
    let a = CenterBox::new(300.0, 300.0, 100.0, 100.0);
    let b = CenterBox::new(330.0, 300.0, 100.0, 100.0);
    let c = CenterBox::new(380.0, 300.0, 100.0, 100.0);
    let model_ab = a.to_rect().iou(&b.to_rect());
    let model_ac = a.to_rect().iou(&c.to_rect());
    let disp_ab = ctx.map_to_display(a).iou(&ctx.map_to_display(b));
    let disp_ac = ctx.map_to_display(a).iou(&ctx.map_to_display(c));
    assert!(model_ab > model_ac);
    assert!(disp_ab > disp_ac);
    // Uniform scaling leaves IoU unchanged.
    assert!((model_ab - disp_ab).abs() < 1e-4);
}
