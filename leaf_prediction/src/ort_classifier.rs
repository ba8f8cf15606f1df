use crate::{
    classifier::{Classifier, Prediction},
    config::{LabelsConfig, ModelConfig},
    error::PredictionError,
    fetch::ensure_model_file,
    labels::load_class_labels,
};
use image::imageops::FilterType;
use ndarray::{Array, Ix4};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use std::sync::Mutex;

/// Decodes an encoded image, resizes it to `input_size` square with
/// nearest-neighbor sampling, normalizes channel values to [0, 1] and lays
/// the pixels out as an NHWC [1, S, S, 3] tensor.
fn image_to_tensor(image_data: &[u8], input_size: u32) -> Result<Array<f32, Ix4>, PredictionError> {
    let image_reader = image::ImageReader::new(std::io::Cursor::new(image_data))
        .with_guessed_format()
        .map_err(|e| PredictionError::ImageDecode(format!("Error reading image: {}", e)))?;

    let original_img = image_reader
        .decode()
        .map_err(|e| PredictionError::ImageDecode(format!("Error decoding image: {}", e)))?;

    let img = original_img.resize_exact(input_size, input_size, FilterType::Nearest);

    let size = input_size as usize;
    let mut input = Array::zeros((1, size, size, 3));
    for (x, y, pixel) in img.to_rgba8().enumerate_pixels() {
        let x = x as usize;
        let y = y as usize;
        let [r, g, b, _] = pixel.0;
        input[[0, y, x, 0]] = (r as f32) / 255.;
        input[[0, y, x, 1]] = (g as f32) / 255.;
        input[[0, y, x, 2]] = (b as f32) / 255.;
    }

    Ok(input)
}

/// Linear max-scan over the output probabilities. Ties keep the earlier
/// element, so the lowest index wins.
fn top_class(probabilities: &[f32]) -> Option<(usize, f32)> {
    probabilities
        .iter()
        .copied()
        .enumerate()
        .reduce(|accum, item| if item.1 > accum.1 { item } else { accum })
}

pub struct OrtClassifier {
    session: Mutex<Session>,
    output_name: String,
    class_labels: Vec<String>,
    input_size: u32,
}

impl OrtClassifier {
    pub fn new(
        model_config: &ModelConfig,
        labels_config: &LabelsConfig,
    ) -> Result<Self, PredictionError> {
        ensure_model_file(model_config)?;
        let class_labels = load_class_labels(labels_config)?;

        ort::init()
            .commit()
            .map_err(|e| PredictionError::ModelLoad(format!("Failed to init runtime: {}", e)))?;

        let session = Session::builder()
            .and_then(|builder| builder.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|builder| builder.commit_from_file(model_config.get_model_path()))
            .map_err(|e| PredictionError::ModelLoad(format!("Failed to build session: {}", e)))?;

        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| PredictionError::ModelLoad("Model has no outputs".to_string()))?;

        tracing::info!(
            "Created ONNX session with {} class labels",
            class_labels.len()
        );

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            class_labels,
            input_size: model_config.input_size,
        })
    }

    fn run_inference(&self, input: &Array<f32, Ix4>) -> Result<Vec<f32>, PredictionError> {
        let mut session = self
            .session
            .lock()
            .map_err(|e| PredictionError::Inference(format!("Session mutex poisoned: {}", e)))?;

        let tensor_ref = TensorRef::from_array_view(input.view())
            .map_err(|e| PredictionError::Inference(format!("Failed to build tensor: {}", e)))?;

        let outputs = session
            .run(ort::inputs![tensor_ref])
            .map_err(|e| PredictionError::Inference(format!("Inference failed: {}", e)))?;

        let (_, data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| PredictionError::Inference(format!("Failed to extract tensor: {}", e)))?;

        // Copies the probabilities out so the output tensor is dropped here,
        // together with the input view, before predict returns.
        Ok(data.to_vec())
    }
}

impl Classifier for OrtClassifier {
    fn predict(&self, image_data: &[u8]) -> Result<Prediction, PredictionError> {
        let input = image_to_tensor(image_data, self.input_size)?;
        let probabilities = self.run_inference(&input)?;

        let (class_id, confidence) = top_class(&probabilities)
            .ok_or_else(|| PredictionError::InvalidOutput("Empty output tensor".to_string()))?;

        let label = self.class_labels.get(class_id).ok_or_else(|| {
            PredictionError::InvalidOutput(format!(
                "Class index {} outside label table of {} entries",
                class_id,
                self.class_labels.len()
            ))
        })?;

        tracing::debug!("Predicted {} with confidence {:.3}", label, confidence);

        Ok(Prediction {
            label: label.clone(),
            confidence,
        })
    }

    fn class_labels(&self) -> &[String] {
        &self.class_labels
    }
}
