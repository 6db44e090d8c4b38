//! CLI configuration loading and validation.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level CLI configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Vendor library location.
    #[serde(default)]
    pub library: LibraryConfig,

    /// Output defaults.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Vendor library configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Path to the nd2ReadSDK shared library.
    ///
    /// When unset, `ND2SDK_LIBRARY` and then the platform default are tried.
    pub path: Option<PathBuf>,
}

/// Output configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format.
    #[serde(default)]
    pub format: FormatSetting,

    /// Default directory for `frames --output`.
    pub frames_dir: Option<PathBuf>,
}

/// Output format as written in a config file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatSetting {
    #[default]
    Text,
    Json,
    Csv,
}

/// Load configuration from a file.
pub fn load_config(path: &Path) -> Result<CliConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let is_json = path.extension().map_or(false, |e| e == "json");
    let config = parse_config(&content, is_json)?;

    validate_config(&config)?;

    Ok(config)
}

/// Parse configuration text.
fn parse_config(content: &str, is_json: bool) -> Result<CliConfig> {
    if is_json {
        serde_json::from_str(content).with_context(|| "Failed to parse config as JSON")
    } else {
        // Assume TOML
        toml::from_str(content).with_context(|| "Failed to parse config as TOML")
    }
}

/// Validate configuration.
fn validate_config(config: &CliConfig) -> Result<()> {
    if let Some(ref library) = config.library.path {
        if !library.exists() {
            anyhow::bail!("Library file not found: {:?}", library);
        }
    }

    if let Some(ref dir) = config.output.frames_dir {
        if dir.as_os_str().is_empty() {
            anyhow::bail!("output.frames_dir must not be empty");
        }
    }

    Ok(())
}
