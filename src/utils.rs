use std::path::Path;

use image::{DynamicImage, ImageReader};
use serde::Serializer;

use crate::error::{Error, Result};

/// Round a confidence score to three decimal places.
///
/// Rounds the exact value of `score`; scaling in `f32` first can push values just
/// below a half step onto it.
pub fn round_score(score: f32) -> f32 {
    format!("{:.3}", f64::from(score)).parse().unwrap_or(score)
}

/// Scores are written as plain JSON numbers; an exact zero is written as `0`.
pub(crate) fn serialize_score<S>(score: &f32, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if *score == 0.0 {
        serializer.serialize_u8(0)
    } else {
        serializer.serialize_f32(*score)
    }
}

/// Open and decode an image, normalized to 8-bit RGB.
pub(crate) fn load_rgb_image(path: &Path) -> Result<DynamicImage> {
    if !path.exists() {
        return Err(Error::ImageNotFound(path.to_path_buf()));
    }

    let img = ImageReader::open(path)
        .map_err(image::ImageError::IoError)?
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?
        .decode()?;

    tracing::debug!(
        path = %path.display(),
        width = img.width(),
        height = img.height(),
        "decoded image"
    );

    Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
}
