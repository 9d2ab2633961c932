//! Implemented layout models.

mod detectron2;

pub use detectron2::{default_session_builder, Detectron2Model, Detectron2PretrainedModel};

use crate::{DetectedBlock, Result};

/// Anything that can find layout blocks in a page image.
pub trait LayoutModel {
    /// Detect blocks over the whole image, in the model's output order.
    fn detect(&self, img: &image::DynamicImage) -> Result<Vec<DetectedBlock>>;
}

impl<M: LayoutModel + ?Sized> LayoutModel for &M {
    fn detect(&self, img: &image::DynamicImage) -> Result<Vec<DetectedBlock>> {
        (**self).detect(img)
    }
}
