use geo_types::{coord, Rect};

use crate::error::{Error, Result};

/// PubLayNet layout categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockLabel {
    Text,
    Title,
    List,
    Table,
    Figure,
}

impl BlockLabel {
    /// Class ids in model output order.
    pub const LABEL_MAP: [(i64, BlockLabel); 5] = [
        (0, BlockLabel::Text),
        (1, BlockLabel::Title),
        (2, BlockLabel::List),
        (3, BlockLabel::Table),
        (4, BlockLabel::Figure),
    ];

    pub fn from_class_id(class_id: i64) -> Result<Self> {
        Self::LABEL_MAP
            .iter()
            .find(|(id, _)| *id == class_id)
            .map(|(_, label)| *label)
            .ok_or(Error::UnknownLabel(class_id))
    }
}

/// A single region reported by the layout model, in source image pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedBlock {
    pub bbox: Rect<f32>,
    pub label: BlockLabel,
    pub score: f32,
}

impl DetectedBlock {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, label: BlockLabel, score: f32) -> Self {
        let bbox = Rect::new(coord! { x: x1, y: y1 }, coord! { x: x2, y: y2 });

        Self { bbox, label, score }
    }

    /// Left edge.
    pub fn x(&self) -> f32 {
        self.bbox.min().x
    }

    /// Top edge.
    pub fn y(&self) -> f32 {
        self.bbox.min().y
    }

    pub fn width(&self) -> f32 {
        self.bbox.width()
    }

    pub fn height(&self) -> f32 {
        self.bbox.height()
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }
}
