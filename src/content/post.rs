//! Post models

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::markdown::CodeBlock;
use super::FrontMatter;

/// Placeholder shown when a post does not declare a reading time
pub const DEFAULT_READ_TIME: &str = "5 min read";

/// Resolved post metadata, derived once per load and never mutated after
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostMetadata {
    /// Caller-supplied opaque identifier
    pub id: String,

    /// Post title
    pub title: String,

    /// Publication date, kept as the author wrote it
    pub date: String,

    /// Free-form reading-time label
    pub read_time: String,

    /// Post tags
    pub tags: Vec<String>,
}

impl PostMetadata {
    /// Materialize metadata from parsed front matter, filling defaults for
    /// anything the document did not declare
    pub fn from_front_matter(id: &str, fm: &FrontMatter) -> Self {
        Self {
            id: id.to_string(),
            title: fm
                .title
                .clone()
                .unwrap_or_else(|| format!("Blog Post {}", id)),
            date: fm
                .date
                .clone()
                .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string()),
            read_time: fm
                .read_time
                .clone()
                .unwrap_or_else(|| DEFAULT_READ_TIME.to_string()),
            tags: fm.tags.clone(),
        }
    }
}

/// A fully loaded blog post
#[derive(Debug, Clone, Serialize)]
pub struct BlogPost {
    #[serde(flatten)]
    pub metadata: PostMetadata,

    /// Metadata-stripped markdown body
    pub raw: String,

    /// Rendered HTML content
    pub content: String,

    /// Code blocks found during rendering, in document order
    pub code_blocks: Vec<CodeBlock>,
}

/// Listing entry: metadata without the rendered body
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    #[serde(flatten)]
    pub metadata: PostMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_synthesized() {
        let fm = FrontMatter::default();
        let meta = PostMetadata::from_front_matter("first-post", &fm);

        assert_eq!(meta.id, "first-post");
        assert_eq!(meta.title, "Blog Post first-post");
        assert_eq!(meta.read_time, DEFAULT_READ_TIME);
        assert!(meta.tags.is_empty());
        // Default date is the retrieval-time date
        assert_eq!(meta.date, Local::now().format("%Y-%m-%d").to_string());
    }

    #[test]
    fn test_summary_serializes_flat() {
        let meta = PostMetadata {
            id: "p".to_string(),
            title: "T".to_string(),
            date: "2024-01-02".to_string(),
            read_time: "5 min read".to_string(),
            tags: vec!["a".to_string()],
        };
        let value = serde_json::to_value(PostSummary { metadata: meta }).unwrap();

        // The listing API exposes metadata fields at the top level
        assert_eq!(value["id"], "p");
        assert_eq!(value["title"], "T");
        assert_eq!(value["tags"][0], "a");
    }

    #[test]
    fn test_front_matter_values_win() {
        let fm = FrontMatter {
            title: Some("Real Title".to_string()),
            date: Some("2024-01-02".to_string()),
            read_time: Some("2 min read".to_string()),
            tags: vec!["a".to_string()],
        };
        let meta = PostMetadata::from_front_matter("x", &fm);

        assert_eq!(meta.title, "Real Title");
        assert_eq!(meta.date, "2024-01-02");
        assert_eq!(meta.read_time, "2 min read");
        assert_eq!(meta.tags, vec!["a"]);
    }
}
