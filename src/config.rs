//! Render configuration.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! command-line overrides.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:20738/RPC2";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub font_name: String,
    pub font_size: u32,
    pub group_font_size: u32,
    pub group_border_color: String,
    /// Minimum time fraction for a node or edge to be rendered.
    pub threshold: Option<f64>,
    /// Cluster functions by module prefix when the profile has no groups.
    pub group_by_module: bool,
    pub tool: String,
    pub image_format: String,
    pub server_url: String,
    pub update_interval_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_name: "Verdana".to_string(),
            font_size: 7,
            group_font_size: 10,
            group_border_color: ".5 0 .9".to_string(),
            threshold: None,
            group_by_module: false,
            tool: "dot".to_string(),
            image_format: "png".to_string(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            update_interval_ms: 1000,
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub font_name: Option<String>,
    pub font_size: Option<u32>,
    pub threshold: Option<f64>,
    pub group_by_module: bool,
    pub tool: Option<String>,
    pub image_format: Option<String>,
    pub server_url: Option<String>,
    pub update_interval_ms: Option<u64>,
}

impl RenderConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RenderConfig = toml::from_str(content).context("Invalid render configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load config file {}", path.display()))
    }

    /// Defaults, or the given file if any.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_toml_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) -> Result<()> {
        if let Some(font_name) = overrides.font_name {
            self.font_name = font_name;
        }
        if let Some(font_size) = overrides.font_size {
            self.font_size = font_size;
        }
        if overrides.threshold.is_some() {
            self.threshold = overrides.threshold;
        }
        if overrides.group_by_module {
            self.group_by_module = true;
        }
        if let Some(tool) = overrides.tool {
            self.tool = tool;
        }
        if let Some(image_format) = overrides.image_format {
            self.image_format = image_format;
        }
        if let Some(server_url) = overrides.server_url {
            self.server_url = server_url;
        }
        if let Some(interval) = overrides.update_interval_ms {
            self.update_interval_ms = interval;
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if let Some(threshold) = self.threshold {
            if !(0.0..=1.0).contains(&threshold) {
                anyhow::bail!("threshold must be a fraction between 0 and 1, got {}", threshold);
            }
        }
        if self.tool.trim().is_empty() {
            anyhow::bail!("tool must not be empty");
        }
        Ok(())
    }
}
