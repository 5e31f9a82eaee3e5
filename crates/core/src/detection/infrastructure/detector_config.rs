use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detection::domain::scale_scanner::ScanParams;
use crate::shared::constants::{DEFAULT_INITIAL_SCALE, DEFAULT_SCALE_FACTOR, DEFAULT_STEP_SIZE};
use crate::shared::error::DetectionError;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] DetectionError),
}

/// Scan tuning persisted as JSON. Missing keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub initial_scale: f64,
    pub scale_factor: f64,
    pub step_size: f64,
    /// Scan threads; 1 keeps the scan on the calling thread.
    pub workers: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            initial_scale: DEFAULT_INITIAL_SCALE,
            scale_factor: DEFAULT_SCALE_FACTOR,
            step_size: DEFAULT_STEP_SIZE,
            workers: 1,
        }
    }
}

impl DetectorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(write_err)
    }

    pub fn scan_params(&self) -> ScanParams {
        ScanParams {
            initial_scale: self.initial_scale,
            scale_factor: self.scale_factor,
            step_size: self.step_size,
        }
    }

    pub fn validate(&self) -> Result<(), DetectionError> {
        self.scan_params().validate()?;
        if self.workers == 0 {
            return Err(DetectionError::input("workers must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_matches_scan_defaults() {
        let config = DetectorConfig::default();
        assert_eq!(config.scan_params(), ScanParams::default());
        assert_eq!(config.workers, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("detector.json");
        let config = DetectorConfig {
            initial_scale: 2.0,
            scale_factor: 1.1,
            step_size: 1.5,
            workers: 8,
        };
        config.save(&path).unwrap();
        assert_eq!(DetectorConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{"workers": 3}"#).unwrap();

        let config = DetectorConfig::load(&path).unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.initial_scale, DEFAULT_INITIAL_SCALE);
        assert_eq!(config.scale_factor, DEFAULT_SCALE_FACTOR);
    }

    #[rstest]
    #[case::zero_scale(r#"{"initial_scale": 0.0}"#)]
    #[case::shrinking_factor(r#"{"scale_factor": 0.9}"#)]
    #[case::unit_factor(r#"{"scale_factor": 1.0}"#)]
    #[case::negative_step(r#"{"step_size": -1.0}"#)]
    #[case::no_workers(r#"{"workers": 0}"#)]
    fn test_invalid_values_rejected(#[case] json: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, json).unwrap();
        assert!(matches!(
            DetectorConfig::load(&path),
            Err(ConfigError::Invalid(DetectionError::Input(_)))
        ));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ workers: ").unwrap();
        assert!(matches!(
            DetectorConfig::load(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DetectorConfig::load(&dir.path().join("none.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
