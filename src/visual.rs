//! Result shapes written on stdout.

use serde::Serialize;

use crate::detected_block::{BlockLabel, DetectedBlock};
use crate::utils::{round_score, serialize_score};

/// The visual element kinds callers care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualType {
    Figure,
    Table,
}

impl VisualType {
    /// `None` for labels that are not figures or tables.
    pub fn from_label(label: BlockLabel) -> Option<Self> {
        match label {
            BlockLabel::Figure => Some(VisualType::Figure),
            BlockLabel::Table => Some(VisualType::Table),
            BlockLabel::Text | BlockLabel::Title | BlockLabel::List => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationType {
    Figure,
    Table,
    Skip,
}

impl From<VisualType> for ClassificationType {
    fn from(value: VisualType) -> Self {
        match value {
            VisualType::Figure => ClassificationType::Figure,
            VisualType::Table => ClassificationType::Table,
        }
    }
}

/// Dominant visual element of one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    #[serde(rename = "type")]
    pub kind: ClassificationType,
    #[serde(serialize_with = "serialize_score")]
    pub score: f32,
    pub skip: bool,
}

impl ClassificationResult {
    pub fn skip() -> Self {
        Self {
            kind: ClassificationType::Skip,
            score: 0.0,
            skip: true,
        }
    }

    pub(crate) fn matched(kind: VisualType, score: f32) -> Self {
        Self {
            kind: kind.into(),
            score: round_score(score),
            skip: false,
        }
    }
}

/// Integer pixel box, truncated toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelBox {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl PixelBox {
    pub fn from_block(block: &DetectedBlock) -> Self {
        Self {
            x: block.x() as i64,
            y: block.y() as i64,
            width: block.width() as i64,
            height: block.height() as i64,
        }
    }
}

/// One figure or table located on a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionResult {
    #[serde(rename = "type")]
    pub kind: VisualType,
    #[serde(serialize_with = "serialize_score")]
    pub score: f32,
    pub bbox: PixelBox,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_serializes_with_integer_zero() {
        let json = serde_json::to_string(&ClassificationResult::skip()).unwrap();
        assert_eq!(json, r#"{"type":"skip","score":0,"skip":true}"#);
    }

    #[test]
    fn matched_rounds_score() {
        let result = ClassificationResult::matched(VisualType::Table, 0.87654);
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"type":"table","score":0.877,"skip":false}"#);
    }

    #[test]
    fn only_figures_and_tables_are_visual() {
        assert_eq!(VisualType::from_label(BlockLabel::Figure), Some(VisualType::Figure));
        assert_eq!(VisualType::from_label(BlockLabel::Table), Some(VisualType::Table));
        assert_eq!(VisualType::from_label(BlockLabel::Text), None);
        assert_eq!(VisualType::from_label(BlockLabel::Title), None);
        assert_eq!(VisualType::from_label(BlockLabel::List), None);
    }

    #[test]
    fn pixel_box_truncates() {
        let block = DetectedBlock::new(10.9, 20.7, 110.2, 80.95, BlockLabel::Figure, 0.9);
        let bbox = PixelBox::from_block(&block);
        assert_eq!(bbox.x, 10);
        assert_eq!(bbox.y, 20);
        // 99.3 and 60.25 after float subtraction
        assert_eq!(bbox.width, 99);
        assert_eq!(bbox.height, 60);
    }

    #[test]
    fn region_serializes_bbox_fields() {
        let region = RegionResult {
            kind: VisualType::Figure,
            score: 0.9,
            bbox: PixelBox {
                x: 1,
                y: 2,
                width: 3,
                height: 4,
            },
        };
        let json = serde_json::to_string(&region).unwrap();
        assert_eq!(
            json,
            r#"{"type":"figure","score":0.9,"bbox":{"x":1,"y":2,"width":3,"height":4}}"#
        );
    }
}
