//! Scaffold a new post document

use anyhow::Result;
use std::fs;

use crate::content::DEFAULT_READ_TIME;
use crate::Viewer;

/// Create `{content_dir}/{slug}.md` with comment front matter filled in
pub fn run(viewer: &Viewer, title: &str) -> Result<()> {
    let id = slug::slugify(title);
    if id.is_empty() {
        anyhow::bail!("Title produces an empty identifier: {:?}", title);
    }

    fs::create_dir_all(&viewer.content_dir)?;

    let file_path = viewer.content_dir.join(format!("{}.md", id));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let now = chrono::Local::now();
    let content = format!(
        "# {}\n<!-- date: {} -->\n<!-- readTime: {} -->\n<!-- tags: -->\n\n",
        title,
        now.format("%Y-%m-%d"),
        DEFAULT_READ_TIME
    );

    fs::write(&file_path, content)?;

    println!("Created: {:?}", file_path);
    Ok(())
}
