//! Viewer configuration (postview.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main viewer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Site title shown in page shells
    pub title: String,

    /// Directory holding post documents, addressed as `{content_dir}/{id}.md`.
    ///
    /// The default follows the build-output convention (posts live under the
    /// served assets folder). Point it at a source tree instead to use a
    /// source-relative layout.
    pub content_dir: String,

    /// Directory served as the site root for static assets (images, video)
    pub assets_dir: String,

    /// Path prefix that image references may carry and that must be stripped
    /// at render time, since the assets folder is served as the root
    pub assets_prefix: String,

    /// Ambient dark/light mode
    pub theme: ThemeMode,

    #[serde(default)]
    pub highlight: HighlightConfig,

    /// Whether math delimiters are recognized and rendered
    pub math: bool,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Ambient theme flag, passed read-only into rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Dark,
    Light,
}

/// Syntax highlighting themes, one per mode
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub dark_theme: String,
    pub light_theme: String,
}

/// Preview server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            content_dir: "public/blogContent".to_string(),
            assets_dir: "public".to_string(),
            assets_prefix: "public/".to_string(),
            theme: ThemeMode::Dark,
            highlight: HighlightConfig::default(),
            math: true,
            server: ServerConfig::default(),
        }
    }
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            dark_theme: "base16-ocean.dark".to_string(),
            light_theme: "InspiredGitHub".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
        }
    }
}

impl HighlightConfig {
    /// Syntax theme name for the given mode
    pub fn theme_for(&self, mode: ThemeMode) -> &str {
        match mode {
            ThemeMode::Dark => &self.dark_theme,
            ThemeMode::Light => &self.light_theme,
        }
    }
}

impl ViewerConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: ViewerConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}
