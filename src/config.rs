//! TOML configuration.
//!
//! ```toml
//! [split]
//! layers = ["utilities", "components"]
//! at_rule = "utility"
//! suffix = "utilities"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub split: SplitConfig,
}

/// What the splitter extracts and how derived files are named.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SplitConfig {
    /// Layer names whose member stylesheets are split.
    #[serde(default = "default_layers")]
    pub layers: Vec<String>,
    /// At-rule name of a utility definition.
    #[serde(default = "default_at_rule")]
    pub at_rule: String,
    /// Inserted before the extension of derived file names.
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Read and parse a config file.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn default_layers() -> Vec<String> {
    vec!["utilities".to_string(), "components".to_string()]
}

fn default_at_rule() -> String {
    "utility".to_string()
}

fn default_suffix() -> String {
    "utilities".to_string()
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            layers: default_layers(),
            at_rule: default_at_rule(),
            suffix: default_suffix(),
        }
    }
}
