//! Class-index to label lookup.

use std::borrow::Cow;

/// Label returned for class indices outside the table.
pub const UNKNOWN_LABEL: &str = "unknown";

/// The 80 COCO class names in model output order.
pub const COCO_LABELS: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// Pluggable table mapping class indices to display labels.
#[derive(Clone, Debug)]
pub struct LabelTable {
    names: Vec<Cow<'static, str>>,
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::coco()
    }
}

impl LabelTable {
    /// The 80-entry COCO table.
    pub fn coco() -> Self {
        Self {
            names: COCO_LABELS.iter().map(|name| Cow::Borrowed(*name)).collect(),
        }
    }

    /// Builds a table from owned names, indexed in order.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(|n| Cow::Owned(n.into())).collect(),
        }
    }

    /// Parses one label per line, skipping blank lines.
    pub fn from_lines(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        )
    }

    /// Returns the label for `class_index`, or [`UNKNOWN_LABEL`].
    pub fn label(&self, class_index: u16) -> &str {
        match self.names.get(usize::from(class_index)) {
            Some(name) => name,
            None => UNKNOWN_LABEL,
        }
    }

    /// Returns the number of labels in the table.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
