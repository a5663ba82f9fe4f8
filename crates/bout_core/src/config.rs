//! Runtime configuration.
//!
//! Loaded from a YAML file named by `--config` or `BOUT_CONFIG_PATH`;
//! every field has a default so a partial file is fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};
use thiserror::Error;

use crate::bout::{DEFAULT_GREEN_NAME, DEFAULT_RED_NAME};
use crate::stats::DrawPolicy;

pub const CONFIG_PATH_ENV: &str = "BOUT_CONFIG_PATH";
pub const STORE_PATH_ENV: &str = "BOUT_STORE_PATH";

pub const DEFAULT_STORE_PATH: &str = "matches.json";

/// Names the scoring pages used for throwaway bouts.
pub const DEFAULT_TEST_FENCERS: [&str; 3] = ["test player", "opponent a", "opponent b"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoutConfig {
    pub store_path: PathBuf,
    pub draw_policy: DrawPolicy,
    pub test_fencers: Vec<String>,
    pub default_red_name: String,
    pub default_green_name: String,
}

impl Default for BoutConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            draw_policy: DrawPolicy::default(),
            test_fencers: DEFAULT_TEST_FENCERS.iter().map(|s| s.to_string()).collect(),
            default_red_name: DEFAULT_RED_NAME.to_string(),
            default_green_name: DEFAULT_GREEN_NAME.to_string(),
        }
    }
}

impl BoutConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Loads the configuration from `explicit`, else from `BOUT_CONFIG_PATH`,
    /// else defaults. `BOUT_STORE_PATH` overrides the store path either way.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::resolve(explicit, env::var(CONFIG_PATH_ENV).ok(), env::var(STORE_PATH_ENV).ok())
    }

    fn resolve(
        explicit: Option<&Path>,
        config_env: Option<String>,
        store_env: Option<String>,
    ) -> Result<Self, ConfigError> {
        let from_env = config_env.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).map(PathBuf::from);

        let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => {
                tracing::debug!(path = ?path, "loading config");
                Self::from_file(&path)?
            }
            None => Self::default(),
        };

        if let Some(store) = store_env.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()) {
            tracing::debug!(store = %store, "store path overridden from environment");
            config.store_path = PathBuf::from(store);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store_path must not be empty".to_string()));
        }
        if self.default_red_name.trim().is_empty() || self.default_green_name.trim().is_empty() {
            return Err(ConfigError::Invalid("default fencer names must not be blank".to_string()));
        }
        if self.test_fencers.iter().any(|n| n.trim().is_empty()) {
            return Err(ConfigError::Invalid("test_fencers contains a blank name".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = BoutConfig::default();
        assert_eq!(config.store_path, PathBuf::from("matches.json"));
        assert_eq!(config.draw_policy, DrawPolicy::CountAsDefeat);
        assert_eq!(config.test_fencers, vec!["test player", "opponent a", "opponent b"]);
        assert_eq!(config.default_red_name, "Rouge");
        assert_eq!(config.default_green_name, "Vert");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let config = BoutConfig::from_yaml("draw_policy: separate\nstore_path: /tmp/club.json\n").unwrap();
        assert_eq!(config.draw_policy, DrawPolicy::Separate);
        assert_eq!(config.store_path, PathBuf::from("/tmp/club.json"));
        assert_eq!(config.default_red_name, "Rouge");
        assert_eq!(BoutConfig::from_yaml("").unwrap(), BoutConfig::default());
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(BoutConfig::from_yaml("draw_policy: coin_flip").is_err());
    }

    #[test]
    fn test_resolution_order() {
        let dir = TempDir::new().unwrap();
        let explicit = dir.path().join("explicit.yaml");
        let from_env = dir.path().join("env.yaml");
        fs::write(&explicit, "default_red_name: Left").unwrap();
        fs::write(&from_env, "default_red_name: FromEnv").unwrap();
        let env_path = Some(from_env.display().to_string());

        let config = BoutConfig::resolve(Some(&explicit), env_path.clone(), None).unwrap();
        assert_eq!(config.default_red_name, "Left");

        let config = BoutConfig::resolve(None, env_path, Some("other.json".to_string())).unwrap();
        assert_eq!(config.default_red_name, "FromEnv");
        assert_eq!(config.store_path, PathBuf::from("other.json"));

        let config = BoutConfig::resolve(None, Some("  ".to_string()), None).unwrap();
        assert_eq!(config, BoutConfig::default());
    }

    #[test]
    fn test_missing_file_and_invalid_values() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(matches!(BoutConfig::resolve(Some(&missing), None, None), Err(ConfigError::Read { .. })));

        let blank = dir.path().join("blank.yaml");
        fs::write(&blank, "default_green_name: '  '").unwrap();
        assert!(matches!(BoutConfig::resolve(Some(&blank), None, None), Err(ConfigError::Invalid(_))));
    }
}
