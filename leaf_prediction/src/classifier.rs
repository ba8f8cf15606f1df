use crate::error::PredictionError;
use serde::Serialize;

/// A single classification outcome. Confidence is the raw probability read
/// from the model output; rounding is left to the presentation layer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
}

pub trait Classifier: Send + Sync + 'static {
    fn predict(&self, image_data: &[u8]) -> Result<Prediction, PredictionError>;

    fn class_labels(&self) -> &[String];
}
