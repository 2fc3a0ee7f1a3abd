use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::io::paths;

/// Error type for config loading/saving.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no config at {0} — run `pk login --api-url <url>` to create one")]
    Missing(PathBuf),
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings from config.toml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the board API, e.g. `https://boards.example.com/api`.
    pub api_url: String,
    /// Seconds of remaining token lifetime below which the TUI shows the
    /// expiry countdown.
    #[serde(default = "default_expiry_warning_secs")]
    pub expiry_warning_secs: u64,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    /// Named color overrides, hex strings like "#FB4196".
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

fn default_expiry_warning_secs() -> u64 {
    20
}

impl Config {
    pub fn new(api_url: impl Into<String>) -> Self {
        Config {
            api_url: api_url.into(),
            expiry_warning_secs: default_expiry_warning_secs(),
            ui: UiConfig::default(),
        }
    }

    /// Base URL with any trailing slash removed, so path joins stay clean.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

/// Load the config from the default location.
pub fn load() -> Result<Config, ConfigError> {
    load_from(&paths::config_path())
}

/// Load the config, letting an `--api-url` override both patch a loaded
/// file and stand in for a missing one.
pub fn load_with_override(api_url: Option<&str>) -> Result<Config, ConfigError> {
    match (load(), api_url) {
        (Ok(mut config), Some(url)) => {
            config.api_url = url.to_string();
            Ok(config)
        }
        (Ok(config), None) => Ok(config),
        (Err(ConfigError::Missing(_)), Some(url)) => Ok(Config::new(url)),
        (Err(e), _) => Err(e),
    }
}

pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Missing(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Write the config to the default location, creating the dir if needed.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    save_to(&paths::config_path(), config)
}

pub fn save_to(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    let text = toml::to_string_pretty(config)
        .map_err(|e| std::io::Error::other(e.to_string()))
        .map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
    fs::write(path, text).map_err(|e| ConfigError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::new("https://api.example.com/");
        config.ui.colors.insert("highlight".into(), "#FF0000".into());

        save_to(&path, &config).unwrap();
        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded.api_url, "https://api.example.com/");
        assert_eq!(loaded.expiry_warning_secs, 20);
        assert_eq!(loaded.ui.colors.get("highlight").unwrap(), "#FF0000");
    }

    #[test]
    fn base_url_strips_trailing_slash() {
        let config = Config::new("https://api.example.com/");
        assert_eq!(config.base_url(), "https://api.example.com");
        let config = Config::new("https://api.example.com");
        assert_eq!(config.base_url(), "https://api.example.com");
    }

    #[test]
    fn missing_file_is_a_distinct_error() {
        let dir = TempDir::new().unwrap();
        let err = load_from(&dir.path().join("config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn defaults_fill_absent_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_url = \"http://x\"\n").unwrap();
        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded.expiry_warning_secs, 20);
        assert!(loaded.ui.colors.is_empty());
    }
}
