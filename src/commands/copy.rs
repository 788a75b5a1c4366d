//! Copy a post's code block to the clipboard

use anyhow::Result;

use crate::clipboard::{Clipboard, CopyController, Osc52Clipboard};
use crate::content::LoadState;
use crate::Viewer;

/// Copy the `block`-th code block (zero-based) of the post to the clipboard
pub async fn run(viewer: &Viewer, id: &str, block: usize) -> Result<()> {
    run_with(viewer, id, block, Osc52Clipboard).await
}

async fn run_with<C: Clipboard>(viewer: &Viewer, id: &str, block: usize, clipboard: C) -> Result<()> {
    let loader = viewer.loader();
    let post = match loader.load(id).await {
        LoadState::Loaded(post) => post,
        LoadState::Error(msg) => anyhow::bail!("{}", msg),
        LoadState::Loading => unreachable!("load resolves before returning"),
    };

    let Some(code_block) = post.code_blocks.get(block) else {
        anyhow::bail!(
            "Post {:?} has {} code block(s); block {} does not exist",
            id,
            post.code_blocks.len(),
            block
        );
    };

    let controller = CopyController::new(clipboard);
    if controller.copy(&code_block.id, &code_block.text) {
        println!("Copied {} block {} to clipboard", code_block.label, block);
    } else {
        println!("Copy failed; see log for details");
    }

    Ok(())
}
