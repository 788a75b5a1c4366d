//! Front-matter parsing
//!
//! Posts carry their metadata in HTML comments near the top of the file:
//!
//! ```markdown
//! # Post Title
//! <!-- date: 2024-01-15 -->
//! <!-- readTime: 5 min read -->
//! <!-- tags: rust, async -->
//! ```
//!
//! The title comes from a leading `# ` heading; the comment keys are only
//! recognized within the first ten lines. Every comment line is stripped
//! from the body, wherever it appears; everything else is preserved
//! byte-for-byte. The heading line is not a comment, so it stays in the
//! body and renders there as well as in the page header.

use lazy_static::lazy_static;
use regex::Regex;

/// How many leading lines are scanned for metadata comments
const SCAN_WINDOW: usize = 10;

lazy_static! {
    static ref DATE_RE: Regex = Regex::new(r"^<!--\s*date:\s*(.+?)\s*-->").unwrap();
    static ref READ_TIME_RE: Regex = Regex::new(r"^<!--\s*readTime:\s*(.+?)\s*-->").unwrap();
    static ref TAGS_RE: Regex = Regex::new(r"^<!--\s*tags:\s*(.+?)\s*-->").unwrap();
}

/// Front-matter data extracted from a post document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub read_time: Option<String>,
    pub tags: Vec<String>,
}

impl FrontMatter {
    /// Parse front-matter from a document.
    /// Returns (front_matter, stripped_body).
    ///
    /// This never fails: absent or malformed metadata simply stays `None`
    /// and defaults are applied later when the metadata is materialized.
    pub fn parse(content: &str) -> (Self, String) {
        let lines: Vec<&str> = content.split('\n').collect();
        let mut fm = FrontMatter::default();

        if let Some(first) = lines.first() {
            if let Some(rest) = first.trim().strip_prefix("# ") {
                fm.title = Some(rest.trim().to_string());
            }
        }

        let mut tags_seen = false;
        for line in lines.iter().take(SCAN_WINDOW) {
            let line = line.trim();

            if fm.date.is_none() {
                if let Some(caps) = DATE_RE.captures(line) {
                    fm.date = Some(caps[1].to_string());
                    continue;
                }
            }
            if fm.read_time.is_none() {
                if let Some(caps) = READ_TIME_RE.captures(line) {
                    fm.read_time = Some(caps[1].to_string());
                    continue;
                }
            }
            if !tags_seen {
                if let Some(caps) = TAGS_RE.captures(line) {
                    fm.tags = split_tags(&caps[1]);
                    tags_seen = true;
                }
            }
        }

        // Comment lines are dropped from the body at any position, not only
        // inside the scan window. Everything else keeps its exact position.
        let body = lines
            .iter()
            .filter(|line| !line.trim().starts_with("<!--"))
            .copied()
            .collect::<Vec<_>>()
            .join("\n");

        (fm, body)
    }
}

/// Split a comma-separated tags value into trimmed, non-empty tokens
fn split_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
