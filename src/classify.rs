use std::path::Path;

use crate::models::LayoutModel;
use crate::utils::load_rgb_image;
use crate::visual::{ClassificationResult, VisualType};
use crate::{DetectedBlock, Result};

/// Decide whether an image is mainly a figure, a table, or neither.
pub fn classify_image<M: LayoutModel>(
    model: &M,
    image_path: &Path,
    min_score: f32,
) -> Result<ClassificationResult> {
    let img = load_rgb_image(image_path)?;
    let blocks = model.detect(&img)?;

    Ok(classify_blocks(&blocks, img.width(), img.height(), min_score))
}

/// Pick the figure or table with the highest confidence weighted by covered area.
///
/// Blocks below `min_score` are ignored. On exact ties the first block in model
/// output order wins.
pub fn classify_blocks(
    blocks: &[DetectedBlock],
    image_width: u32,
    image_height: u32,
    min_score: f32,
) -> ClassificationResult {
    let image_area = image_width as f32 * image_height as f32;

    let mut best: Option<(VisualType, f32)> = None;
    let mut best_combined = 0.0_f32;

    for block in blocks.iter().filter(|b| b.score >= min_score) {
        let Some(kind) = VisualType::from_label(block.label) else {
            continue;
        };

        let combined = block.score * (block.area() / image_area);
        if combined > best_combined {
            best_combined = combined;
            best = Some((kind, block.score));
        }
    }

    match best {
        Some((kind, score)) => {
            tracing::debug!(?kind, score, combined = best_combined, "classified image");
            ClassificationResult::matched(kind, score)
        }
        None => ClassificationResult::skip(),
    }
}
