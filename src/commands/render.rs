//! Render a single post to a standalone HTML page

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::content::LoadState;
use crate::templates;
use crate::Viewer;

/// Render the post with the given id; write to `output` or stdout
pub async fn run(viewer: &Viewer, id: &str, output: Option<&Path>) -> Result<()> {
    let loader = viewer.loader();
    let post = match loader.load(id).await {
        LoadState::Loaded(post) => post,
        LoadState::Error(msg) => anyhow::bail!("{}", msg),
        LoadState::Loading => unreachable!("load resolves before returning"),
    };

    let html = templates::post_page(&post, &viewer.config);

    match output {
        Some(path) => {
            fs::write(path, html)?;
            println!("Rendered {:?} to {:?}", id, path);
        }
        None => print!("{}", html),
    }

    Ok(())
}
