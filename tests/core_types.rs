use detpost::{
    CenterBox, DetPostError, LabelTable, OwnedTensor, Rect, TensorLayout, TensorView,
    UNKNOWN_LABEL,
};

#[test]
fn tensor_view_rejects_missing_box_channels() {
    let data = [0.0f32; 6];

    let err = TensorView::new(&data, 3, 2).err().unwrap();
    assert_eq!(
        err,
        DetPostError::ShapeMismatch {
            context: "box channels",
            expected: 4,
            got: 3,
        }
    );
}

#[test]
fn tensor_view_rejects_length_mismatch() {
    let data = [0.0f32; 10];

    let err = TensorView::new(&data, 6, 2).err().unwrap();
    assert_eq!(
        err,
        DetPostError::ShapeMismatch {
            context: "tensor length",
            expected: 12,
            got: 10,
        }
    );
}

#[test]
fn tensor_view_get_is_bounds_checked() {
    let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
    let view = TensorView::new(&data, 6, 2).unwrap();

    assert_eq!(view.get(5, 1).unwrap(), 11.0);
    assert_eq!(
        view.get(6, 0).err().unwrap(),
        DetPostError::OutOfRange {
            channel: 6,
            anchor: 0,
            channels: 6,
            anchors: 2,
        }
    );
    assert_eq!(
        view.get(0, 2).err().unwrap(),
        DetPostError::OutOfRange {
            channel: 0,
            anchor: 2,
            channels: 6,
            anchors: 2,
        }
    );
}

#[test]
fn tensor_view_is_zero_copy() {
    let data = vec![1.0f32; 84 * 3];
    let view = TensorView::new(&data, 84, 3).unwrap();
    assert!(std::ptr::eq(view.as_slice(), data.as_slice()));
    assert_eq!(view.num_classes(), 80);
}

#[test]
fn from_shape_reads_both_layouts() {
    let data: Vec<f32> = (0..10).map(|v| v as f32).collect();

    let cm = TensorView::from_shape(&data, &[1, 5, 2], TensorLayout::ChannelMajor).unwrap();
    assert_eq!((cm.channels(), cm.anchors()), (5, 2));
    assert_eq!(cm.get(4, 0).unwrap(), 8.0);

    let am = TensorView::from_shape(&data, &[1, 2, 5], TensorLayout::AnchorMajor).unwrap();
    assert_eq!((am.channels(), am.anchors()), (5, 2));
    assert_eq!(am.get(4, 0).unwrap(), 4.0);
    assert_eq!(am.get(0, 1).unwrap(), 5.0);
}

#[test]
fn from_shape_rejects_batches_and_bad_rank() {
    let data = [0.0f32; 10];

    let err = TensorView::from_shape(&data, &[2, 5, 1], TensorLayout::ChannelMajor)
        .err()
        .unwrap();
    assert_eq!(
        err,
        DetPostError::ShapeMismatch {
            context: "batch size",
            expected: 1,
            got: 2,
        }
    );

    let err = TensorView::from_shape(&data, &[5, 2], TensorLayout::ChannelMajor)
        .err()
        .unwrap();
    assert_eq!(
        err,
        DetPostError::ShapeMismatch {
            context: "tensor rank",
            expected: 3,
            got: 2,
        }
    );
}

#[test]
fn owned_tensor_validates_shape() {
    assert!(OwnedTensor::new(vec![0.0; 9], 5, 2).is_err());
    let owned = OwnedTensor::new(vec![0.0; 10], 5, 2).unwrap();
    assert_eq!(owned.view().anchors(), 2);
    assert_eq!(owned.into_vec().len(), 10);
}

#[test]
fn rect_iou_matches_hand_computed_values() {
    let a = Rect::new(0.0, 0.0, 20.0, 20.0);
    let b = Rect::new(10.0, 10.0, 20.0, 20.0);
    // 100 / (400 + 400 - 100)
    assert!((a.iou(&b) - 100.0 / 700.0).abs() < 1e-6);
    assert!((a.iou(&b) - b.iou(&a)).abs() < 1e-9);
}

#[test]
fn center_box_and_rect_round_trip() {
    let center = CenterBox::new(320.0, 240.0, 64.0, 32.0);
    let rect = Rect::from(center);
    assert_eq!(rect, Rect::new(288.0, 224.0, 64.0, 32.0));
    assert_eq!(rect.to_center(), center);
}

#[test]
fn label_table_resolves_last_coco_index_and_falls_back() {
    let table = LabelTable::coco();
    assert_eq!(table.label(79), "toothbrush");
    assert_eq!(table.label(80), UNKNOWN_LABEL);

    let custom = LabelTable::new(["ripe", "unripe"]);
    assert_eq!(custom.label(1), "unripe");
    assert_eq!(custom.label(2), "unknown");
}
