use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Failed to fetch model: {0}")]
    ModelFetch(String),
    #[error("Failed to load model: {0}")]
    ModelLoad(String),
    #[error("Model is not loaded")]
    ModelNotLoaded,
    #[error("Failed to decode image: {0}")]
    ImageDecode(String),
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Model output invalid: {0}")]
    InvalidOutput(String),
}
