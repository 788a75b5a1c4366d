//! HTML helper functions

/// Escape text for interpolation into HTML content or attribute values
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render a list of tags as pill spans
pub fn tag_list(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!(r#"<span class="post-tag">{}</span>"#, html_escape(t)))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_tag_list() {
        let tags = vec!["rust".to_string(), "async".to_string()];
        let html = tag_list(&tags);
        assert!(html.contains(r#"<span class="post-tag">rust</span>"#));
        assert!(html.contains(r#"<span class="post-tag">async</span>"#));
    }
}
