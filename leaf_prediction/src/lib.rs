mod fetch;
mod labels;
mod ort_classifier;

pub mod classifier;
pub mod config;
pub mod error;

pub use classifier::{Classifier, Prediction};
pub use error::PredictionError;
pub use ort_classifier::OrtClassifier;
