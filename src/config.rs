//! Configuration file handling for shell-qr.
//!
//! Loads configuration from `~/.config/shell-qr/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::output::OutputMode;

/// Configuration file structure for shell-qr.
/// Loaded from ~/.config/shell-qr/config.toml (or custom path via --config).
///
/// Every field is optional so CLI flags and built-in defaults can fill gaps.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub raster: RasterConfig,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    pub path: Option<PathBuf>,
    pub interval_ms: Option<u64>,
    pub scan_existing: Option<bool>,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub mode: Option<OutputMode>,
    pub path: Option<PathBuf>,
    pub keep_history: Option<bool>,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RasterConfig {
    pub scale: Option<u32>,
    pub border: Option<u32>,
}

/// Default config file written by `shell-qr config init`.
pub const DEFAULT_CONFIG: &str = r#"# shell-qr configuration

[watch]
# Transcript file to watch
path = "shell.txt"
# Poll interval in milliseconds (10-60000)
interval_ms = 1000
# Check the file once at startup instead of waiting for the first change
scan_existing = false

[output]
# png, preview, or log
mode = "png"
# Image written in png mode
path = "qr.png"
# Also keep qr-<fingerprint>.png for every new block
keep_history = false

[raster]
# Pixels per grid cell (1-64)
scale = 1
# White border in pixels (0-1024)
border = 0
"#;

impl Config {
    /// Load configuration from the default path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from an explicitly requested path.
    /// Unlike [`Config::load`], a missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("shell-qr").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/shell-qr/config.toml")
        })
}
