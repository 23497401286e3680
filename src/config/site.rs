//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,

    // Directory
    /// Content root, relative to the base directory
    pub content_dir: String,
    /// Output directory for `build`, relative to the base directory
    pub public_dir: String,
    /// Names skipped on top of the built-in list (dot-names always are)
    pub exclude: Vec<String>,

    // Rendering
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub sanitize: SanitizeConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Notes".to_string(),
            content_dir: ".".to_string(),
            public_dir: "public".to_string(),
            exclude: Vec::new(),
            highlight: HighlightConfig::default(),
            sanitize: SanitizeConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Code block highlighting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    /// syntect theme used for the generated stylesheet
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: crate::content::DEFAULT_THEME.to_string(),
        }
    }
}

/// Extra raw HTML let through the sanitizer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizeConfig {
    /// Tag name to the attributes allowed on it
    pub allow_tags: BTreeMap<String, Vec<String>>,
}
