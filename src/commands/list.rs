//! List stored posts

use anyhow::Result;

use crate::content::load_summaries;
use crate::Viewer;

/// Print every stored post with its date, title and tags
pub async fn run(viewer: &Viewer) -> Result<()> {
    let store = viewer.store();
    let summaries = load_summaries(&store).await?;

    println!("Posts ({}):", summaries.len());
    for summary in &summaries {
        let meta = &summary.metadata;
        if meta.tags.is_empty() {
            println!("  {} - {} [{}]", meta.date, meta.title, meta.id);
        } else {
            println!(
                "  {} - {} [{}] ({})",
                meta.date,
                meta.title,
                meta.id,
                meta.tags.join(", ")
            );
        }
    }

    Ok(())
}
