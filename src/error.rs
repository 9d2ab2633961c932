use std::path::PathBuf;

use thiserror::Error;

pub(crate) const SETUP_INSTRUCTIONS: &str = "Layout model unavailable. Either:\n  \
    - allow network access so the PubLayNet model can be fetched from Hugging Face, or\n  \
    - place model.onnx and config.json under ~/.cache/layoutparser-ort/publaynet/\n\
    and make sure the onnxruntime shared library can be loaded.";

/// Failures while bringing up the layout model.
///
/// These are fatal for a process: nothing can be classified without a model.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("ort (onnxruntime) error: {0}")]
    Ort(#[from] ort::Error),
    #[error("hf-hub: {0}")]
    HuggingFace(#[from] hf_hub::api::sync::ApiError),
    #[error("reading model config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("incompatible layout model: {0}")]
    IncompatibleModel(String),
    #[error("parsing model config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{source}\n{}", SETUP_INSTRUCTIONS)]
    Setup {
        #[from]
        source: SetupError,
    },
    #[error("Image not found: {}", .0.display())]
    ImageNotFound(PathBuf),
    #[error("image: {0}")]
    Image(#[from] image::ImageError),
    #[error("ort (onnxruntime) error: {0}")]
    Ort(#[from] ort::Error),
    #[error("model produced unknown class id {0}")]
    UnknownLabel(i64),
    #[error("malformed model output: {0}")]
    MalformedOutput(String),
}

impl Error {
    /// Whether this error came from model setup rather than from processing one image.
    pub fn is_setup(&self) -> bool {
        matches!(self, Error::Setup { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
