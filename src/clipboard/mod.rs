//! Clipboard boundary and per-code-block copy state
//!
//! The copy affordance has two halves: a platform clipboard-write primitive
//! (the `Clipboard` trait; the shipped implementation emits an OSC 52
//! escape sequence, which terminals translate into a system clipboard
//! write) and the `CopyController`, which owns the transient per-block
//! "Copied!" flag and reverts it after two seconds. Copy failures are
//! logged and never surfaced as errors; the flag just stays off.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// How long a block stays in its "copied" state
pub const COPIED_RESET: Duration = Duration::from_millis(2000);

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard write failed: {0}")]
    Write(#[from] io::Error),
}

/// A platform clipboard-write primitive
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard writer using the OSC 52 terminal escape sequence
#[derive(Debug, Default)]
pub struct Osc52Clipboard;

impl Clipboard for Osc52Clipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut stdout = io::stdout();
        write!(stdout, "\x1b]52;c;{}\x07", STANDARD.encode(text))?;
        stdout.flush()?;
        Ok(())
    }
}

/// Transient per-block copy state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlockState {
    pub block_id: String,
    pub copied: bool,
}

/// Tracks which code blocks currently show their "copied" confirmation.
///
/// Blocks are independent; copying one never clears another. A repeat copy
/// of the same block restarts its two-second window.
pub struct CopyController<C> {
    clipboard: C,
    copied: Arc<Mutex<HashMap<String, u64>>>,
    epoch: AtomicU64,
}

impl<C: Clipboard> CopyController<C> {
    pub fn new(clipboard: C) -> Self {
        Self {
            clipboard,
            copied: Arc::new(Mutex::new(HashMap::new())),
            epoch: AtomicU64::new(0),
        }
    }

    /// Copy a block's literal text to the clipboard, trimmed of surrounding
    /// whitespace. Returns whether the copy succeeded; failure is logged
    /// and leaves the block in its un-copied state.
    pub fn copy(&self, block_id: &str, text: &str) -> bool {
        let payload = text.trim();

        if let Err(e) = self.clipboard.write_text(payload) {
            tracing::warn!("copy failed for block {:?}: {}", block_id, e);
            return false;
        }

        let epoch = self.epoch.fetch_add(1, Ordering::Relaxed) + 1;
        self.copied
            .lock()
            .expect("copy state lock poisoned")
            .insert(block_id.to_string(), epoch);

        self.schedule_reset(block_id.to_string(), epoch);
        true
    }

    /// Current state for one block
    pub fn block_state(&self, block_id: &str) -> CodeBlockState {
        let copied = self
            .copied
            .lock()
            .expect("copy state lock poisoned")
            .contains_key(block_id);
        CodeBlockState {
            block_id: block_id.to_string(),
            copied,
        }
    }

    /// Revert the flag after the reset window, unless a newer copy of the
    /// same block has restarted it
    fn schedule_reset(&self, block_id: String, epoch: u64) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no async runtime; copied flag for {:?} will not revert", block_id);
            return;
        };

        let copied = Arc::clone(&self.copied);
        handle.spawn(async move {
            tokio::time::sleep(COPIED_RESET).await;
            let mut copied = copied.lock().expect("copy state lock poisoned");
            if copied.get(&block_id) == Some(&epoch) {
                copied.remove(&block_id);
            }
        });
    }
}
