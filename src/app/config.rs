use std::fmt;
use std::path::Path;

use serde::Deserialize;

use config::Config;

use crate::pipeline::LabelTable;
use crate::{Error, Result};

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub detector: DetectorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub model_filename: String,
    /// Side of the square model input, in pixels.
    pub input_size: u32,
    pub norm_mean: f32,
    pub norm_std: f32,
    /// Exclusive: a candidate must score above it.
    pub threshold: f32,
    pub max_candidates: usize,
    pub labels: Vec<String>,
    /// Takes precedence over `labels` when set.
    pub label_filename: Option<String>,
    pub num_threads: usize,
    pub clamp_boxes: bool,
    pub unknown_class: UnknownClassPolicy,
}

/// What the decoder does with a class id that has no label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnknownClassPolicy {
    /// Drop the candidate and keep decoding.
    #[default]
    Skip,
    /// Abort the whole call with `Error::UnknownClassId`.
    Fail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl fmt::Display for DetectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "model {}, {}x{} input, norm ({}, {}), threshold {}, {} candidates, {} threads",
            self.model_filename,
            self.input_size,
            self.input_size,
            self.norm_mean,
            self.norm_std,
            self.threshold,
            self.max_candidates,
            self.num_threads
        )
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_filename: "models/face_mask_detector.tflite".to_string(),
            input_size: 160,
            norm_mean: 127.5,
            norm_std: 127.5,
            threshold: 0.6,
            max_candidates: 10,
            labels: vec!["No Mask".to_string(), "Mask".to_string()],
            label_filename: None,
            num_threads: 1,
            clamp_boxes: false,
            unknown_class: UnknownClassPolicy::Skip,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            return Err(Error::InvalidConfig("input_size must be positive".to_string()));
        }
        if self.max_candidates == 0 {
            return Err(Error::InvalidConfig("max_candidates must be positive".to_string()));
        }
        if !(self.norm_std > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "norm_std must be positive, got {}",
                self.norm_std
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::InvalidConfig(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        if self.label_filename.is_none() && self.labels.is_empty() {
            return Err(Error::InvalidConfig("label table is empty".to_string()));
        }
        Ok(())
    }

    pub fn label_table(&self) -> Result<LabelTable> {
        let table = match &self.label_filename {
            Some(filename) => LabelTable::from_file(Path::new(filename))?,
            None => LabelTable::new(self.labels.clone()),
        };
        if table.is_empty() {
            return Err(Error::InvalidConfig("label table is empty".to_string()));
        }
        Ok(table)
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let config: AppConfig = Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix("maskrust")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        config.detector.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_mask_detector() {
        let config = AppConfig::default();
        assert_eq!(config.detector.input_size, 160);
        assert_eq!(config.detector.norm_mean, 127.5);
        assert_eq!(config.detector.norm_std, 127.5);
        assert_eq!(config.detector.threshold, 0.6);
        assert_eq!(config.detector.max_candidates, 10);
        assert_eq!(config.detector.labels, vec!["No Mask", "Mask"]);
        assert_eq!(config.detector.unknown_class, UnknownClassPolicy::Skip);
        assert_eq!(config.logging.filter, "info");
        assert!(config.detector.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = DetectorConfig::default();
        config.norm_std = 0.0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = DetectorConfig::default();
        config.threshold = 1.5;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = DetectorConfig::default();
        config.labels.clear();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = DetectorConfig::default();
        config.input_size = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir()
            .join(format!("maskrust-config-{}.yaml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        let yaml = r#"
detector:
  input_size: 224
  threshold: 0.5
  labels: ["bare", "masked"]
  unknown_class: fail
logging:
  filter: debug
"#;
        file.write_all(yaml.as_bytes()).unwrap();
        drop(file);

        let config = AppConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.detector.input_size, 224);
        assert_eq!(config.detector.threshold, 0.5);
        assert_eq!(config.detector.labels, vec!["bare", "masked"]);
        assert_eq!(config.detector.unknown_class, UnknownClassPolicy::Fail);
        // untouched keys keep their defaults
        assert_eq!(config.detector.max_candidates, 10);
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn test_sample_config() {
        let config = AppConfig::from_file(Path::new("config/maskrust.yaml")).unwrap();
        assert_eq!(config.detector.num_threads, 2);
        assert_eq!(config.detector.labels, DetectorConfig::default().labels);
    }

    #[test]
    fn test_environment_overrides_file() {
        // other tests never assert clamp_boxes
        std::env::set_var("MASKRUST_DETECTOR__CLAMP_BOXES", "true");
        let config = AppConfig::from_file(Path::new("config/maskrust.yaml"));
        std::env::remove_var("MASKRUST_DETECTOR__CLAMP_BOXES");

        let config = config.unwrap();
        assert!(config.detector.clamp_boxes);
        assert_eq!(config.detector.num_threads, 2);
    }

    #[test]
    fn test_label_table_from_inline_labels() {
        let table = DetectorConfig::default().label_table().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup(1), Some("Mask"));
    }
}
