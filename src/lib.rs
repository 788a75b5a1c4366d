//! postview: a markdown blog post viewer
//!
//! Posts are plain markdown documents with comment-style front matter,
//! addressed by opaque identifiers. This crate loads them from a
//! file-backed document store, extracts the metadata, renders the body
//! through a customizable markdown pipeline, and serves or prints the
//! result.

pub mod clipboard;
pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod server;
pub mod store;
pub mod templates;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use config::ViewerConfig;
use content::{MarkdownRenderer, PostLoader};
use store::FileStore;

/// Configuration file name looked up in the base directory
pub const CONFIG_FILE: &str = "postview.yml";

/// The main viewer application
#[derive(Clone)]
pub struct Viewer {
    /// Viewer configuration
    pub config: ViewerConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Directory holding post documents
    pub content_dir: std::path::PathBuf,
    /// Directory served as the static asset root
    pub assets_dir: std::path::PathBuf,
}

impl Viewer {
    /// Create a new viewer rooted at a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            ViewerConfig::load(&config_path)?
        } else {
            ViewerConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);
        let assets_dir = base_dir.join(&config.assets_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
            assets_dir,
        })
    }

    /// Document store over the content directory
    pub fn store(&self) -> FileStore {
        FileStore::new(&self.content_dir)
    }

    /// Renderer configured from the ambient theme and math settings
    pub fn renderer(&self) -> MarkdownRenderer {
        MarkdownRenderer::with_options(
            self.config.highlight.theme_for(self.config.theme),
            self.config.math,
            &self.config.assets_prefix,
        )
    }

    /// Post loader bound to this viewer's store and renderer
    pub fn loader(&self) -> PostLoader<FileStore> {
        PostLoader::new(Arc::new(self.store()), Arc::new(self.renderer()))
    }
}
