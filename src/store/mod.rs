//! Document store - key-addressable access to raw post documents
//!
//! Posts are addressed by an opaque identifier; the file-backed store maps
//! `id` to `{root}/{id}.md`. The store only hands back raw text; all
//! parsing and rendering happens downstream.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Store failure taxonomy. The messages double as the user-visible error
/// text, so they stay short.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Blog post not found")]
    NotFound { id: String },

    #[error("Failed to load blog post")]
    Transport(#[source] io::Error),
}

/// A key-addressable collection of raw post documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Retrieve the raw text of one document
    async fn fetch(&self, id: &str) -> Result<String, StoreError>;

    /// Enumerate the identifiers of all stored documents
    async fn list(&self) -> Result<Vec<String>, StoreError>;
}

/// File-backed store over a flat directory of `{id}.md` documents
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, id: &str) -> Option<PathBuf> {
        // Identifiers are opaque keys, not paths; anything that would
        // escape the store root is treated as absent.
        if id.contains('/') || id.contains('\\') || id.contains("..") {
            return None;
        }
        Some(self.root.join(format!("{}.md", id)))
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn fetch(&self, id: &str) -> Result<String, StoreError> {
        let path = self.document_path(id).ok_or_else(|| StoreError::NotFound {
            id: id.to_string(),
        })?;

        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound {
                id: id.to_string(),
            }),
            Err(e) => Err(StoreError::Transport(e)),
        }
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let root = self.root.clone();

        // WalkDir is blocking; the directory is small but keep it off the
        // async workers anyway.
        let ids = tokio::task::spawn_blocking(move || {
            let mut ids = Vec::new();
            for entry in WalkDir::new(&root)
                .max_depth(1)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("md") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        ids.push(stem.to_string());
                    }
                }
            }
            ids.sort();
            ids
        })
        .await
        .map_err(|e| StoreError::Transport(io::Error::other(e)))?;

        Ok(ids)
    }
}
