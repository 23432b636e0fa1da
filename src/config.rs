use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::api::SimulationOptions;
use crate::persistence::DEFAULT_STORAGE_KEY;
use crate::submission::RetryPolicy;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config yaml {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    /// Simulated checkout endpoint
    #[serde(default)]
    pub api: SimulationOptions,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PersistenceConfig {
    pub storage_key: String,
    pub data_dir: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            data_dir: "./data/storage".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: "./logs".to_string(),
            log_file: "checkout.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
            api: SimulationOptions::default(),
            retry: RetryPolicy::default(),
            persistence: PersistenceConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load `config/{env}.yaml`
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        Self::from_file(format!("config/{}.yaml", env))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ScenarioKind;

    const MINIMAL: &str = r#"
log_level: debug
log_dir: ./logs
log_file: checkout.log
use_json: false
rotation: never
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = AppConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.api, SimulationOptions::default());
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.persistence.storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn test_sections_override_defaults() {
        let yaml = format!(
            "{}{}",
            MINIMAL,
            r#"
api:
  delay_ms: 10
  scenarios:
    - { type: network_error, weight: 0.25 }
    - { type: success, weight: 0.75 }
retry:
  max_attempts: 5
persistence:
  storage_key: demo-form
"#
        );
        let config = AppConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config.api.delay_ms, 10);
        assert_eq!(config.api.field_validation_delay_ms, 300);
        assert_eq!(config.api.scenarios.select(0.1), ScenarioKind::NetworkError);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.max_delay_ms, 5000);
        assert_eq!(config.persistence.storage_key, "demo-form");
    }

    #[test]
    fn test_unnormalized_weights_are_rejected() {
        let yaml = format!(
            "{}{}",
            MINIMAL,
            "api:\n  scenarios:\n    - { type: success, weight: 0.9 }\n"
        );
        assert!(AppConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            AppConfig::from_file("config/does-not-exist.yaml"),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_shipped_dev_config_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/dev.yaml");
        let config = AppConfig::from_file(path).unwrap();
        assert_eq!(config.persistence.storage_key, DEFAULT_STORAGE_KEY);
    }
}
