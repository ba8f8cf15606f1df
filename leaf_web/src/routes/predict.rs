use crate::server::SharedState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use leaf_prediction::{Prediction, PredictionError};
use std::time::Instant;
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug)]
pub enum PredictRequestError {
    #[error("No model is loaded")]
    ModelNotLoaded,
    #[error("Image decode failed: {0}")]
    ImageDecode(String),
    #[error("Prediction failed: {0}")]
    Prediction(String),
    #[error("Inference task failed: {0}")]
    TaskJoin(String),
}

impl From<PredictionError> for PredictRequestError {
    fn from(err: PredictionError) -> Self {
        match err {
            PredictionError::ModelNotLoaded => PredictRequestError::ModelNotLoaded,
            PredictionError::ImageDecode(msg) => PredictRequestError::ImageDecode(msg),
            other => PredictRequestError::Prediction(other.to_string()),
        }
    }
}

impl IntoResponse for PredictRequestError {
    fn into_response(self) -> Response {
        let status = match self {
            PredictRequestError::ModelNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
            PredictRequestError::ImageDecode(_) => StatusCode::BAD_REQUEST,
            PredictRequestError::Prediction(_) | PredictRequestError::TaskJoin(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}

#[instrument(skip(state, image_data))]
pub async fn predict(
    State(state): State<SharedState>,
    image_data: Bytes,
) -> Result<Json<Prediction>, PredictRequestError> {
    state.metrics.record_request("predict");

    let classifier = state
        .classifier
        .clone()
        .ok_or(PredictRequestError::ModelNotLoaded)?;

    let started = Instant::now();
    let prediction = tokio::task::spawn_blocking(move || classifier.predict(&image_data))
        .await
        .map_err(|e| PredictRequestError::TaskJoin(e.to_string()))??;

    state
        .metrics
        .record_prediction_duration(started.elapsed().as_millis() as u64);
    state.metrics.record_prediction(&prediction.label);

    Ok(Json(prediction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::Metrics;
    use image::{ImageBuffer, Rgb};
    use leaf_prediction::Classifier;
    use std::io::Cursor;
    use std::sync::Arc;

    const TEST_LABELS: [&str; 4] = [
        "Healthy",
        "Common Rust",
        "Gray Leaf Spot",
        "Northern Leaf Blight",
    ];

    struct MockClassifier {
        class_labels: Vec<String>,
    }

    impl MockClassifier {
        fn new() -> Self {
            Self {
                class_labels: TEST_LABELS.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    impl Classifier for MockClassifier {
        fn predict(&self, image_data: &[u8]) -> Result<Prediction, PredictionError> {
            image::ImageReader::new(Cursor::new(image_data))
                .with_guessed_format()
                .map_err(|e| PredictionError::ImageDecode(e.to_string()))?
                .decode()
                .map_err(|e| PredictionError::ImageDecode(e.to_string()))?;

            Ok(Prediction {
                label: self.class_labels[0].clone(),
                confidence: 0.875,
            })
        }

        fn class_labels(&self) -> &[String] {
            &self.class_labels
        }
    }

    fn state_with(classifier: Option<Arc<dyn Classifier>>) -> SharedState {
        SharedState {
            classifier,
            metrics: Arc::new(Metrics::new()),
        }
    }

    fn encode_test_png() -> Vec<u8> {
        let img = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(10, 10, Rgb([0, 0, 0]));
        let mut image_data: Vec<u8> = Vec::new();
        let mut cursor = Cursor::new(&mut image_data);
        img.write_to(&mut cursor, image::ImageFormat::Png).unwrap();
        image_data
    }

    #[tokio::test]
    async fn test_predict_returns_label_and_confidence() {
        let state = state_with(Some(Arc::new(MockClassifier::new())));
        let image_data = Bytes::from(encode_test_png());

        let Json(prediction) = predict(State(state), image_data).await.unwrap();

        assert!(TEST_LABELS.contains(&prediction.label.as_str()));
        assert!((0.0..=1.0).contains(&prediction.confidence));
        assert_eq!(prediction.confidence, 0.875);
    }

    #[tokio::test]
    async fn test_predict_without_model_is_service_unavailable() {
        let state = state_with(None);
        let image_data = Bytes::from(encode_test_png());

        let err = predict(State(state), image_data).await.unwrap_err();

        assert!(matches!(err, PredictRequestError::ModelNotLoaded));
        assert_eq!(
            err.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn test_predict_with_undecodable_image_is_bad_request() {
        let state = state_with(Some(Arc::new(MockClassifier::new())));
        let image_data = Bytes::from_static(b"not an image at all");

        let err = predict(State(state), image_data).await.unwrap_err();

        assert!(matches!(err, PredictRequestError::ImageDecode(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
