use std::path::Path;

use itertools::Itertools;

use crate::models::LayoutModel;
use crate::utils::{load_rgb_image, round_score};
use crate::visual::{PixelBox, RegionResult, VisualType};
use crate::{DetectedBlock, Result};

/// Locate every figure and table on a page image, in reading order.
pub fn detect_regions<M: LayoutModel>(
    model: &M,
    image_path: &Path,
    min_score: f32,
) -> Result<Vec<RegionResult>> {
    let img = load_rgb_image(image_path)?;
    let blocks = model.detect(&img)?;

    let regions = collect_regions(&blocks, min_score);
    tracing::debug!(count = regions.len(), "detected visual regions");

    Ok(regions)
}

/// Keep figure and table blocks at or above `min_score`, sorted top to bottom then
/// left to right. Overlapping blocks are kept as they are.
pub fn collect_regions(blocks: &[DetectedBlock], min_score: f32) -> Vec<RegionResult> {
    blocks
        .iter()
        .filter(|block| block.score >= min_score)
        .filter_map(|block| {
            let kind = VisualType::from_label(block.label)?;
            Some(RegionResult {
                kind,
                score: round_score(block.score),
                bbox: PixelBox::from_block(block),
            })
        })
        // stable, so equal positions keep detection order
        .sorted_by_key(|region| (region.bbox.y, region.bbox.x))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlockLabel;

    fn block(x: f32, y: f32, w: f32, h: f32, label: BlockLabel, score: f32) -> DetectedBlock {
        DetectedBlock::new(x, y, x + w, y + h, label, score)
    }

    #[test]
    fn keeps_only_confident_figures_and_tables() {
        let blocks = vec![
            block(0.0, 0.0, 10.0, 10.0, BlockLabel::Text, 0.99),
            block(0.0, 10.0, 10.0, 10.0, BlockLabel::List, 0.99),
            block(0.0, 20.0, 10.0, 10.0, BlockLabel::Figure, 0.3),
            block(0.0, 30.0, 10.0, 10.0, BlockLabel::Table, 0.7),
            block(0.0, 40.0, 10.0, 10.0, BlockLabel::Figure, 0.5),
        ];

        let regions = collect_regions(&blocks, 0.5);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].kind, VisualType::Table);
        assert_eq!(regions[1].kind, VisualType::Figure);
        assert!(regions.iter().all(|r| r.score >= 0.5));
    }

    #[test]
    fn sorted_top_to_bottom_then_left_to_right() {
        let blocks = vec![
            block(300.0, 500.0, 10.0, 10.0, BlockLabel::Figure, 0.9),
            block(400.0, 100.0, 10.0, 10.0, BlockLabel::Table, 0.9),
            block(50.0, 100.0, 10.0, 10.0, BlockLabel::Figure, 0.9),
            block(10.0, 300.0, 10.0, 10.0, BlockLabel::Table, 0.9),
        ];

        let regions = collect_regions(&blocks, 0.5);
        let positions: Vec<_> = regions.iter().map(|r| (r.bbox.x, r.bbox.y)).collect();
        assert_eq!(positions, vec![(50, 100), (400, 100), (10, 300), (300, 500)]);
    }

    #[test]
    fn equal_positions_keep_detection_order() {
        let blocks = vec![
            block(10.0, 10.0, 100.0, 50.0, BlockLabel::Table, 0.6),
            block(10.0, 10.0, 80.0, 40.0, BlockLabel::Figure, 0.8),
        ];

        let regions = collect_regions(&blocks, 0.5);
        assert_eq!(regions[0].kind, VisualType::Table);
        assert_eq!(regions[1].kind, VisualType::Figure);
    }

    #[test]
    fn sort_uses_truncated_coordinates() {
        // both truncate to y = 100, so x decides
        let blocks = vec![
            block(90.0, 100.9, 10.0, 10.0, BlockLabel::Figure, 0.9),
            block(20.0, 100.1, 10.0, 10.0, BlockLabel::Table, 0.9),
        ];

        let regions = collect_regions(&blocks, 0.5);
        assert_eq!(regions[0].bbox.x, 20);
        assert_eq!(regions[1].bbox.x, 90);
    }

    #[test]
    fn overlapping_blocks_are_not_merged() {
        let blocks = vec![
            block(0.0, 0.0, 100.0, 100.0, BlockLabel::Figure, 0.9),
            block(5.0, 5.0, 90.0, 90.0, BlockLabel::Figure, 0.85),
        ];

        assert_eq!(collect_regions(&blocks, 0.5).len(), 2);
    }

    #[test]
    fn nothing_qualifying_is_empty() {
        let blocks = vec![block(0.0, 0.0, 10.0, 10.0, BlockLabel::Title, 0.9)];
        assert!(collect_regions(&blocks, 0.5).is_empty());
    }

    #[test]
    fn scores_are_rounded() {
        let blocks = vec![block(0.0, 0.0, 10.0, 10.0, BlockLabel::Table, 0.87654)];
        assert_eq!(collect_regions(&blocks, 0.5)[0].score, 0.877);
    }
}
