use crate::{config::LabelsConfig, error::PredictionError};
use std::{
    fs::File,
    io::{self, BufRead},
    path::Path,
};

pub fn load_class_labels(config: &LabelsConfig) -> Result<Vec<String>, PredictionError> {
    read_labels(&config.get_labels_path())
        .map_err(|e| PredictionError::ModelLoad(format!("Failed to load labels: {}", e)))
}

/// Reads one label per line; blank lines are skipped. The line order is the
/// model's output index order.
fn read_labels(filepath: &Path) -> io::Result<Vec<String>> {
    let file = File::open(filepath)?;
    let reader = io::BufReader::new(file);
    let mut labels = Vec::new();

    for line_result in reader.lines() {
        let line = line_result?;
        let label = line.trim();
        if !label.is_empty() {
            labels.push(label.to_string());
        }
    }

    if labels.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("No labels found in {:?}", filepath),
        ));
    }

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_labels_in_file_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Healthy").unwrap();
        writeln!(file, "Common Rust").unwrap();
        writeln!(file, "Gray Leaf Spot").unwrap();
        writeln!(file, "Northern Leaf Blight").unwrap();

        let labels = read_labels(file.path()).unwrap();

        assert_eq!(
            labels,
            vec![
                "Healthy",
                "Common Rust",
                "Gray Leaf Spot",
                "Northern Leaf Blight"
            ]
        );
    }

    #[test]
    fn test_read_labels_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Healthy").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  Common Rust  ").unwrap();

        let labels = read_labels(file.path()).unwrap();

        assert_eq!(labels, vec!["Healthy", "Common Rust"]);
    }

    #[test]
    fn test_read_labels_empty_file_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();

        assert!(read_labels(file.path()).is_err());
    }

    #[test]
    fn test_read_labels_missing_file_fails() {
        assert!(read_labels(Path::new("/nonexistent/labels.txt")).is_err());
    }
}
