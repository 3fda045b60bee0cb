//! Tool configuration loaded from YAML

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::tileset::ValidationPolicy;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub validation: ValidationPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ToolConfig {
    /// Load configuration from YAML file
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;

        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Save configuration to YAML file
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(path, yaml)
            .with_context(|| format!("Failed to write config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_strict_without_image_checks() {
        let config = ToolConfig::default();

        assert_eq!(config.logging.level, "info");
        assert!(config.validation.require_contiguous_ids);
        assert!(config.validation.require_unique_types);
        assert!(config.validation.require_uniform_size);
        assert!(!config.validation.check_images);
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let config: ToolConfig = serde_yaml::from_str(
            "validation:\n  check_images: true\n  require_unique_types: false\n",
        )
        .unwrap();

        assert_eq!(config.logging.level, "info");
        assert!(config.validation.check_images);
        assert!(!config.validation.require_unique_types);
        assert!(config.validation.require_contiguous_ids);
    }

    #[test]
    fn test_config_serialization() {
        let mut config = ToolConfig::default();
        config.logging.level = "debug".into();
        config.validation.check_images = true;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("climate-tiles.yaml");
        config.to_yaml(&path).unwrap();

        let loaded_config = ToolConfig::from_yaml(&path).unwrap();
        assert_eq!(config, loaded_config);
    }

    #[test]
    fn missing_file_keeps_the_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        let err = ToolConfig::from_yaml(&path).unwrap_err();
        assert!(err.to_string().contains("absent.yaml"));
        let io = err.root_cause().downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn malformed_yaml_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "logging: [unclosed\n").unwrap();

        let err = ToolConfig::from_yaml(&path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config"));
        assert!(err.chain().any(|cause| cause.is::<serde_yaml::Error>()));
    }
}
