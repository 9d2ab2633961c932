use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SetupError};
use crate::models::{
    default_session_builder, Detectron2Model, Detectron2PretrainedModel, LayoutModel,
};
use crate::DetectedBlock;

/// Settings stored next to locally cached weights.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LocalModelConfig {
    pub model_name: String,
    /// Index of the output tensor holding confidence scores.
    pub confidence_score_index: usize,
}

impl Default for LocalModelConfig {
    fn default() -> Self {
        Self {
            model_name: "publaynet/faster_rcnn_R_50_FPN_3x".to_string(),
            confidence_score_index: Detectron2PretrainedModel::FASTER_RCNN_R_50_FPN_3X
                .confidence_score_index(),
        }
    }
}

impl LocalModelConfig {
    pub fn from_file(path: &Path) -> Result<Self, SetupError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SetupError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SetupError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// `~/.cache/layoutparser-ort/publaynet`
pub fn default_cache_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".cache").join("layoutparser-ort").join("publaynet"))
}

/// Owns the layout model and creates it on first use.
///
/// Local weights are preferred when both `model.onnx` and `config.json` exist in the
/// cache directory; otherwise the PubLayNet model is fetched from Hugging Face.
pub struct ModelLoader {
    cache_dir: Option<PathBuf>,
    model: OnceCell<Detectron2Model>,
}

impl ModelLoader {
    pub const WEIGHTS_FILE: &'static str = "model.onnx";
    pub const CONFIG_FILE: &'static str = "config.json";

    pub fn new() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            model: OnceCell::new(),
        }
    }

    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: Some(cache_dir.into()),
            model: OnceCell::new(),
        }
    }

    /// Weights and config paths, only if both files exist.
    pub fn local_paths(&self) -> Option<(PathBuf, PathBuf)> {
        let dir = self.cache_dir.as_ref()?;
        let weights = dir.join(Self::WEIGHTS_FILE);
        let config = dir.join(Self::CONFIG_FILE);

        (weights.is_file() && config.is_file()).then_some((weights, config))
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    /// The shared model, loading it on the first call.
    pub fn get_model(&self) -> Result<&Detectron2Model> {
        if let Some(model) = self.model.get() {
            return Ok(model);
        }

        let model = self.load()?;
        Ok(self.model.get_or_init(|| model))
    }

    fn load(&self) -> Result<Detectron2Model, SetupError> {
        match self.local_paths() {
            Some((weights, config)) => {
                let config = LocalModelConfig::from_file(&config)?;
                tracing::info!(path = %weights.display(), "using locally cached layout model");

                Detectron2Model::new_from_file(
                    &weights,
                    &config.model_name,
                    Detectron2Model::DEFAULT_CONFIDENCE_THRESHOLD,
                    config.confidence_score_index,
                    default_session_builder()?,
                )
            }
            None => {
                tracing::info!("no local layout model, fetching pretrained PubLayNet model");
                Detectron2Model::pretrained(Detectron2PretrainedModel::FASTER_RCNN_R_50_FPN_3X)
            }
        }
    }
}

impl LayoutModel for ModelLoader {
    fn detect(&self, img: &image::DynamicImage) -> Result<Vec<DetectedBlock>> {
        self.get_model()?.predict(img)
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}
