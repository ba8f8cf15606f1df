mod health;
mod index;
mod metrics;
mod predict;

use crate::server::SharedState;
use axum::{
    routing::{get, post},
    Router,
};

pub use health::healthcheck;
pub use index::index;
pub use metrics::metrics_handler;
pub use predict::predict;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(index))
        .route("/api/predict", post(predict))
        .route("/health_check", get(healthcheck))
        .route("/metrics", get(metrics_handler))
}
