use std::path::Path;

use image::imageops;
use itertools::Itertools;
use ndarray::{Array, ArrayBase, ArrayViewD, Dim, OwnedRepr};
use ort::{Session, SessionBuilder, SessionOutputs};

use crate::error::{Error, Result, SetupError};
use crate::models::LayoutModel;
use crate::{BlockLabel, DetectedBlock};

/// A Detectron2 layout model exported to ONNX.
pub struct Detectron2Model {
    model_name: String,
    model: ort::Session,
    confidence_threshold: f32,
    confidence_score_index: usize,
}

/// Pretrained Detectron2 models from Hugging Face.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detectron2PretrainedModel {
    /// PubLayNet Faster R-CNN, ResNet-50 FPN backbone, 3x schedule.
    FASTER_RCNN_R_50_FPN_3X,
}

impl Detectron2PretrainedModel {
    pub fn name(&self) -> &str {
        self.hf_repo()
    }

    pub fn hf_repo(&self) -> &str {
        match self {
            Self::FASTER_RCNN_R_50_FPN_3X => "unstructuredio/detectron2_faster_rcnn_R_50_FPN_3x",
        }
    }

    pub fn hf_filename(&self) -> &str {
        match self {
            Self::FASTER_RCNN_R_50_FPN_3X => "model.onnx",
        }
    }

    pub fn confidence_score_index(&self) -> usize {
        match self {
            Self::FASTER_RCNN_R_50_FPN_3X => 2,
        }
    }
}

/// Session builder with any execution providers enabled through cargo features.
///
/// Providers that fail to register are skipped and inference runs on the CPU.
pub fn default_session_builder() -> Result<SessionBuilder, SetupError> {
    #[allow(unused_mut)]
    let mut providers: Vec<ort::ExecutionProviderDispatch> = Vec::new();

    #[cfg(feature = "tensorrt")]
    providers.push(ort::TensorRTExecutionProvider::default().build());
    #[cfg(feature = "cuda")]
    providers.push(ort::CUDAExecutionProvider::default().build());
    #[cfg(feature = "directml")]
    providers.push(ort::DirectMLExecutionProvider::default().build());
    #[cfg(feature = "coreml")]
    providers.push(ort::CoreMLExecutionProvider::default().build());
    #[cfg(feature = "rocm")]
    providers.push(ort::ROCmExecutionProvider::default().build());
    #[cfg(feature = "openvino")]
    providers.push(ort::OpenVINOExecutionProvider::default().build());

    Ok(Session::builder()?.with_execution_providers(providers)?)
}

/// Image input of the exported graph.
pub const INPUT_NAME: &str = "x.1";

/// onnxruntime's message when a node fails mid-graph. The exported Detectron2 graph
/// hits this on pages without any detections.
const NODE_FAILURE_MESSAGE: &str = "Non-zero status code returned while running";

/// Reject graphs that cannot be fed or read the way [`Detectron2Model`] does.
fn check_signature(
    input_names: &[&str],
    output_count: usize,
    confidence_score_index: usize,
) -> Result<(), SetupError> {
    if !input_names.contains(&INPUT_NAME) {
        return Err(SetupError::IncompatibleModel(format!(
            "expected input `{INPUT_NAME}`, model has {input_names:?}"
        )));
    }

    // boxes, class ids and scores
    let required = (confidence_score_index + 1).max(2);
    if output_count < required {
        return Err(SetupError::IncompatibleModel(format!(
            "expected at least {required} outputs, model has {output_count}"
        )));
    }

    Ok(())
}

fn is_empty_detection_failure(message: &str) -> bool {
    message.contains(NODE_FAILURE_MESSAGE)
}

impl Detectron2Model {
    pub const REQUIRED_WIDTH: u32 = 800;
    pub const REQUIRED_HEIGHT: u32 = 1035;
    pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.3;

    pub fn pretrained(p_model: Detectron2PretrainedModel) -> Result<Self, SetupError> {
        Self::configure_pretrained(
            p_model,
            Self::DEFAULT_CONFIDENCE_THRESHOLD,
            default_session_builder()?,
        )
    }

    pub fn configure_pretrained(
        p_model: Detectron2PretrainedModel,
        confidence_threshold: f32,
        session_builder: SessionBuilder,
    ) -> Result<Self, SetupError> {
        let api = hf_hub::api::sync::Api::new()?;
        let filename = api
            .model(p_model.hf_repo().to_string())
            .get(p_model.hf_filename())?;

        tracing::debug!(path = %filename.display(), "loading pretrained layout model");
        let model = session_builder.commit_from_file(filename)?;

        Self::from_session(
            model,
            p_model.name(),
            confidence_threshold,
            p_model.confidence_score_index(),
        )
    }

    pub fn new_from_file(
        file_path: &Path,
        model_name: &str,
        confidence_threshold: f32,
        confidence_score_index: usize,
        session_builder: SessionBuilder,
    ) -> Result<Self, SetupError> {
        tracing::debug!(path = %file_path.display(), "loading layout model");
        let model = session_builder.commit_from_file(file_path)?;

        Self::from_session(model, model_name, confidence_threshold, confidence_score_index)
    }

    fn from_session(
        model: Session,
        model_name: &str,
        confidence_threshold: f32,
        confidence_score_index: usize,
    ) -> Result<Self, SetupError> {
        let input_names: Vec<&str> = model.inputs.iter().map(|i| i.name.as_str()).collect();
        check_signature(&input_names, model.outputs.len(), confidence_score_index)?;

        Ok(Self {
            model_name: model_name.to_string(),
            model,
            confidence_threshold,
            confidence_score_index,
        })
    }

    /// Run the model over the full image. Blocks come back in model output order.
    pub fn predict(&self, img: &image::DynamicImage) -> Result<Vec<DetectedBlock>> {
        let (img_width, img_height, input) = self.preprocess(img);

        let run_result = self.model.run(ort::inputs![INPUT_NAME => input]?);
        match run_result {
            Ok(outputs) => self.postprocess(&outputs, img_width, img_height),
            Err(err) if is_empty_detection_failure(&err.to_string()) => {
                tracing::warn!(
                    error = %err,
                    "Ignoring runtime error from onnx (likely due to encountering blank page)."
                );
                Ok(vec![])
            }
            Err(err) => Err(err.into()),
        }
    }

    fn preprocess(
        &self,
        img: &image::DynamicImage,
    ) -> (u32, u32, ArrayBase<OwnedRepr<f32>, Dim<[usize; 3]>>) {
        let (img_width, img_height) = (img.width(), img.height());
        let img = img.resize_exact(
            Self::REQUIRED_WIDTH,
            Self::REQUIRED_HEIGHT,
            imageops::FilterType::Triangle,
        );
        let img_rgb8 = img.into_rgb8();

        let mut input = Array::zeros((
            3,
            Self::REQUIRED_HEIGHT as usize,
            Self::REQUIRED_WIDTH as usize,
        ));

        for (x, y, pixel) in img_rgb8.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            let [r, g, b] = pixel.0;
            input[[0, y, x]] = r as f32;
            input[[1, y, x]] = g as f32;
            input[[2, y, x]] = b as f32;
        }

        (img_width, img_height, input)
    }

    fn postprocess<'s>(
        &self,
        outputs: &SessionOutputs<'s>,
        img_width: u32,
        img_height: u32,
    ) -> Result<Vec<DetectedBlock>> {
        let bboxes = outputs[0].try_extract_tensor::<f32>()?;
        let labels = outputs[1].try_extract_tensor::<i64>()?;
        let confidence_scores = outputs[self.confidence_score_index].try_extract_tensor::<f32>()?;

        let scale = (
            img_width as f32 / Self::REQUIRED_WIDTH as f32,
            img_height as f32 / Self::REQUIRED_HEIGHT as f32,
        );

        let blocks = decode_detections(
            bboxes.view(),
            labels.view(),
            confidence_scores.view(),
            self.confidence_threshold,
            scale,
        )?;

        tracing::debug!(
            model = %self.model_name,
            threshold = self.confidence_threshold,
            count = blocks.len(),
            "layout detection finished"
        );

        Ok(blocks)
    }
}

/// Turn raw model tensors into blocks in source image pixels.
///
/// `scale` maps model input coordinates back to the source image. Scores at or below
/// `confidence_threshold` are dropped; the rest keep their output order.
fn decode_detections(
    bboxes: ArrayViewD<'_, f32>,
    labels: ArrayViewD<'_, i64>,
    confidence_scores: ArrayViewD<'_, f32>,
    confidence_threshold: f32,
    scale: (f32, f32),
) -> Result<Vec<DetectedBlock>> {
    let (width_conversion, height_conversion) = scale;
    let mut blocks = vec![];

    for (bbox, (class_id, confidence_score)) in bboxes
        .rows()
        .into_iter()
        .zip(labels.iter().zip(confidence_scores.iter()))
    {
        if *confidence_score <= confidence_threshold {
            continue;
        }

        let (x1, y1, x2, y2) = bbox
            .iter()
            .copied()
            .collect_tuple()
            .ok_or_else(|| Error::MalformedOutput(format!("box with {} values", bbox.len())))?;

        blocks.push(DetectedBlock::new(
            x1 * width_conversion,
            y1 * height_conversion,
            x2 * width_conversion,
            y2 * height_conversion,
            BlockLabel::from_class_id(*class_id)?,
            *confidence_score,
        ));
    }

    Ok(blocks)
}

impl LayoutModel for Detectron2Model {
    fn detect(&self, img: &image::DynamicImage) -> Result<Vec<DetectedBlock>> {
        self.predict(img)
    }
}
