use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaxonomyError};
use crate::taxonomy::DEFAULT_ROOT_LABEL;

const CONFIG_FILE: &str = "config.toml";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# taxonomy configuration file
# Location: ~/.taxonomy/config.toml

[taxonomy]
# Label of the synthetic root the parsed taxonomy is attached under
# Default: "Taxonomy"
root_label = "Taxonomy"

# Field holding the notation when the input is a .json file
# Default: "taxonomy"
json_key = "taxonomy"

[output]
# Default output format for `taxonomy tree` and `taxonomy parse`
# One of: "tree", "json", "notation"
format = "tree"
"#;

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub taxonomy: TaxonomyConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Parsing and assembly settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxonomyConfig {
    /// Root label for assembled trees
    #[serde(default = "default_root_label")]
    pub root_label: String,

    /// JSON field holding the notation
    #[serde(default = "default_json_key")]
    pub json_key: String,
}

fn default_root_label() -> String {
    DEFAULT_ROOT_LABEL.to_string()
}

fn default_json_key() -> String {
    "taxonomy".to_string()
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            root_label: default_root_label(),
            json_key: default_json_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// How results are printed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Box-drawing tree
    #[default]
    Tree,
    /// Pretty JSON with sorted keys
    Json,
    /// Canonical bracket notation
    Notation,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tree => "tree",
            Self::Json => "json",
            Self::Notation => "notation",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = TaxonomyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tree" => Ok(Self::Tree),
            "json" => Ok(Self::Json),
            "notation" => Ok(Self::Notation),
            other => Err(TaxonomyError::InvalidConfigValue {
                key: "output.format".to_string(),
                message: format!("unknown format '{}' (expected tree, json or notation)", other),
            }),
        }
    }
}

impl Config {
    /// Load config from base directory
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content).map_err(|e| TaxonomyError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save config to base directory
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        let content = toml::to_string_pretty(self).map_err(|e| TaxonomyError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        fs::write(&path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(base_dir: &Path) -> Result<PathBuf> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path)
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "taxonomy.root_label" => Some(self.taxonomy.root_label.clone()),
            "taxonomy.json_key" => Some(self.taxonomy.json_key.clone()),
            "output.format" => Some(self.output.format.to_string()),
            _ => None,
        }
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "taxonomy.root_label" => {
                self.taxonomy.root_label = non_empty(key, value)?;
                Ok(())
            }
            "taxonomy.json_key" => {
                self.taxonomy.json_key = non_empty(key, value)?;
                Ok(())
            }
            "output.format" => {
                self.output.format = value.parse()?;
                Ok(())
            }
            _ => Err(TaxonomyError::ConfigKeyNotFound {
                key: key.to_string(),
            }),
        }
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        ["taxonomy.root_label", "taxonomy.json_key", "output.format"]
            .into_iter()
            .filter_map(|key| self.get(key).map(|value| (key.to_string(), value)))
            .collect()
    }
}

fn non_empty(key: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TaxonomyError::InvalidConfigValue {
            key: key.to_string(),
            message: "value must not be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.taxonomy.root_label, "Taxonomy");
        assert_eq!(config.taxonomy.json_key, "taxonomy");
        assert_eq!(config.output.format, OutputFormat::Tree);
    }

    #[test]
    fn test_load_missing_returns_default() {
        let temp = TempDir::new().unwrap();
        assert_eq!(Config::load(temp.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_init_template_parses_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = Config::init(temp.path()).unwrap();
        assert_eq!(path, Config::path(temp.path()));
        assert_eq!(Config::load(temp.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.set("taxonomy.root_label", "Topics").unwrap();
        config.set("output.format", "json").unwrap();
        config.save(temp.path()).unwrap();

        let loaded = Config::load(temp.path()).unwrap();
        assert_eq!(loaded.taxonomy.root_label, "Topics");
        assert_eq!(loaded.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(Config::path(temp.path()), "[output]\nformat = \"notation\"\n").unwrap();

        let config = Config::load(temp.path()).unwrap();
        assert_eq!(config.output.format, OutputFormat::Notation);
        assert_eq!(config.taxonomy.root_label, "Taxonomy");
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp = TempDir::new().unwrap();
        fs::write(Config::path(temp.path()), "[output\nformat = 1").unwrap();

        let err = Config::load(temp.path()).unwrap_err();
        assert!(matches!(err, TaxonomyError::ConfigParse { .. }));
    }

    #[test]
    fn test_config_get_set() {
        let mut config = Config::default();

        config.set("taxonomy.json_key", " scheme ").unwrap();
        assert_eq!(config.get("taxonomy.json_key").unwrap(), "scheme");
        assert!(config.get("taxonomy.unknown").is_none());

        let err = config.set("taxonomy.unknown", "x").unwrap_err();
        assert!(matches!(err, TaxonomyError::ConfigKeyNotFound { .. }));
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("taxonomy.root_label", "  "),
            Err(TaxonomyError::InvalidConfigValue { .. })
        ));
        assert!(matches!(
            config.set("output.format", "yaml"),
            Err(TaxonomyError::InvalidConfigValue { .. })
        ));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_list() {
        let keys: Vec<_> = Config::default().list().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["taxonomy.root_label", "taxonomy.json_key", "output.format"]
        );
    }
}
