use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    pub onnx_file: String,
    pub model_dir: PathBuf,
    /// Remote location the model is fetched from when the local file is
    /// absent. When unset, the file must already be in `model_dir`.
    pub url: Option<String>,
    #[serde(default = "default_input_size")]
    pub input_size: u32,
}

fn default_input_size() -> u32 {
    224
}

impl ModelConfig {
    pub fn get_model_path(&self) -> PathBuf {
        self.model_dir.join(&self.onnx_file)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.input_size == 0 {
            return Err("Model input size must be non-zero".to_string());
        }
        if self.url.is_none() && !self.get_model_path().exists() {
            return Err(format!(
                "Model file not found and no url configured: {:?}",
                self.get_model_path()
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LabelsConfig {
    pub labels_file: String,
    pub labels_dir: PathBuf,
}

impl LabelsConfig {
    pub fn get_labels_path(&self) -> PathBuf {
        self.labels_dir.join(&self.labels_file)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.get_labels_path().exists() {
            return Err(format!(
                "Labels file not found: {:?}",
                self.get_labels_path()
            ));
        }
        Ok(())
    }
}
