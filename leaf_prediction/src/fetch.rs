use crate::{config::ModelConfig, error::PredictionError};
use std::fs;
use std::path::Path;

/// Makes sure the configured model file is present locally, fetching it from
/// the configured url when it is not. The fetch happens at most once per
/// process lifetime; there is no retry and no integrity check.
///
/// Uses a blocking HTTP client, so callers on an async runtime must run this
/// on the blocking pool.
pub fn ensure_model_file(config: &ModelConfig) -> Result<(), PredictionError> {
    let path = config.get_model_path();
    if path.exists() {
        tracing::debug!("Model file already present: {:?}", path);
        return Ok(());
    }

    let url = config
        .url
        .as_deref()
        .ok_or_else(|| PredictionError::ModelFetch(format!("Model file not found: {:?}", path)))?;

    download_model(url, &path)
}

fn download_model(url: &str, path: &Path) -> Result<(), PredictionError> {
    tracing::info!("Downloading model from {}", url);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| PredictionError::ModelFetch(format!("Failed to create model dir: {}", e)))?;
    }

    let response = reqwest::blocking::get(url)
        .map_err(|e| PredictionError::ModelFetch(format!("Request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(PredictionError::ModelFetch(format!(
            "Download failed with status {}",
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .map_err(|e| PredictionError::ModelFetch(format!("Failed to read response body: {}", e)))?;

    fs::write(path, &bytes)
        .map_err(|e| PredictionError::ModelFetch(format!("Failed to write model file: {}", e)))?;

    tracing::info!("Model written to {:?} ({} bytes)", path, bytes.len());

    Ok(())
}
