//! Configuration file structure for `.indicator.toml`
//!
//! Configuration files can be placed in:
//! - User home directory: `~/.indicator.toml` (user defaults)
//! - Project directory: `./.indicator.toml` (project defaults)
//!
//! Precedence order (highest to lowest):
//! 1. Command-line arguments (`--store`, `--format`, `--compact`)
//! 2. Project config (`./.indicator.toml`)
//! 3. User config (`~/.indicator.toml`)
//! 4. Built-in defaults

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".indicator.toml";
pub const DEFAULT_STORE_PATH: &str = "indicators.json";

pub const STARTER_CONFIG: &str = r#"# Indicator CLI configuration

[store]
# JSON file holding indicators and organizations
# path = "indicators.json"

[output]
# Output format: json or yaml
# format = "json"

# Compact JSON output (no pretty-printing)
# compact = false
"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Record store settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreConfig>,

    /// Output settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON store file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (json, yaml)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Default compact JSON output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compact: Option<bool>,
}

impl Config {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Find and load configuration files.
    /// Returns (`user_config`, `project_config`)
    pub fn discover_configs() -> (Option<Self>, Option<Self>) {
        let user_config = Self::user_config_path().and_then(|path| Self::load_optional(&path, "user"));
        let project_config = Self::load_optional(&Self::project_config_path(), "project");
        (user_config, project_config)
    }

    pub fn user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    pub fn project_config_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE_NAME)
    }

    /// Load a config file if it exists, warning instead of failing on errors.
    fn load_optional(path: &Path, scope: &str) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!(
                    "{} Failed to load {scope} config from {}: {e:#}",
                    "Warning:".yellow().bold(),
                    path.display()
                );
                None
            }
        }
    }

    /// Merge configs with precedence project > user > defaults
    pub fn merge(user_config: Option<Self>, project_config: Option<Self>) -> Self {
        let mut merged = Self::default();
        for config in [user_config, project_config].into_iter().flatten() {
            if let Some(store) = config.store {
                let mut merged_store = merged.store.unwrap_or_default();
                if let Some(path) = store.path {
                    merged_store.path = Some(path);
                }
                merged.store = Some(merged_store);
            }
            if let Some(output) = config.output {
                let mut merged_output = merged.output.unwrap_or_default();
                if let Some(format) = output.format {
                    merged_output.format = Some(format);
                }
                if let Some(compact) = output.compact {
                    merged_output.compact = Some(compact);
                }
                merged.output = Some(merged_output);
            }
        }
        merged
    }

    /// Store path from config, or the default.
    pub fn store_path(&self) -> PathBuf {
        self.store
            .as_ref()
            .and_then(|store| store.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH))
    }

    pub fn output_format(&self) -> Option<&str> {
        self.output.as_ref().and_then(|output| output.format.as_deref())
    }

    pub fn compact(&self) -> bool {
        self.output
            .as_ref()
            .and_then(|output| output.compact)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            "[store]\npath = \"data/store.json\"\n\n[output]\nformat = \"yaml\"\n",
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.store_path(), PathBuf::from("data/store.json"));
        assert_eq!(config.output_format(), Some("yaml"));
        assert!(!config.compact());
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[store\npath = 1").unwrap();
        let err = Config::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_starter_config_parses_to_defaults() {
        let config: Config = toml::from_str(STARTER_CONFIG).unwrap();
        assert_eq!(config.store_path(), PathBuf::from(DEFAULT_STORE_PATH));
        assert_eq!(config.output_format(), None);
    }

    #[test]
    fn test_merge_project_overrides_user() {
        let user = Config {
            store: Some(StoreConfig {
                path: Some(PathBuf::from("user.json")),
            }),
            output: Some(OutputConfig {
                format: Some("yaml".to_string()),
                compact: Some(true),
            }),
        };
        let project = Config {
            store: None,
            output: Some(OutputConfig {
                format: Some("json".to_string()),
                compact: None,
            }),
        };

        let merged = Config::merge(Some(user), Some(project));
        assert_eq!(merged.store_path(), PathBuf::from("user.json"));
        assert_eq!(merged.output_format(), Some("json"));
        assert!(merged.compact());
    }

    #[test]
    fn test_merge_empty() {
        let merged = Config::merge(None, None);
        assert_eq!(merged, Config::default());
        assert_eq!(merged.store_path(), PathBuf::from(DEFAULT_STORE_PATH));
    }
}
