//! Configuration loading and parsing

use crate::report::StatItem;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tmi_decoder::DecoderConfig;

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    pub capture: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub dimensions: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Selective statistics items; empty means the full report
    #[serde(default)]
    pub stats_items: Vec<StatItem>,
    pub save_stats: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// The three input files every decode needs
#[derive(Debug, Clone)]
pub struct ResolvedInputs {
    pub capture: PathBuf,
    pub catalog: PathBuf,
    pub dimensions: PathBuf,
}

impl InputConfig {
    /// Require all three inputs to be set
    pub fn resolve(&self) -> Result<ResolvedInputs> {
        match (&self.capture, &self.catalog, &self.dimensions) {
            (Some(capture), Some(catalog), Some(dimensions)) => Ok(ResolvedInputs {
                capture: capture.clone(),
                catalog: catalog.clone(),
                dimensions: dimensions.clone(),
            }),
            _ => anyhow::bail!(
                "Select all three files: capture (--capture), catalog (--catalog) and dimensions (--dimensions)"
            ),
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}
