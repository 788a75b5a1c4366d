//! Page shells for rendered posts
//!
//! These are intentionally bare: a metadata header, the rendered article,
//! and the scripts the copy affordance needs. Visual design belongs to
//! whatever embeds the viewer; only the structural classes are promised.

use crate::config::{ThemeMode, ViewerConfig};
use crate::content::{BlogPost, PostSummary};
use crate::helpers::date::display_date;
use crate::helpers::html::{html_escape, tag_list};
use crate::helpers::url::post_href;

/// Copy-to-clipboard behavior for served pages. Mirrors the controller on
/// the Rust side: trimmed payload, 2s "Copied!" window, silent failure.
const COPY_SCRIPT: &str = r#"
<script>
(function() {
    document.querySelectorAll('.copy-button').forEach(function(button) {
        button.addEventListener('click', function() {
            var block = button.closest('.code-block');
            var pre = block && block.querySelector('pre');
            if (!pre) return;
            navigator.clipboard.writeText(pre.innerText.trim()).then(function() {
                button.textContent = 'Copied!';
                setTimeout(function() { button.textContent = 'Copy'; }, 2000);
            }).catch(function(err) {
                console.error('Copy failed:', err);
            });
        });
    });
})();
</script>
"#;

/// Minimal structural styling so the header metadata and code-block
/// chrome are legible without an embedding site
const BASE_STYLE: &str = r#"
<style>
body { max-width: 48rem; margin: 0 auto; padding: 2rem 1rem; font-family: sans-serif; }
body.theme-dark { background: #1c2023; color: #e6e8ea; }
.post-meta { color: #888; font-size: 0.875rem; }
.post-tag { border: 1px solid #8884; border-radius: 1rem; padding: 0 0.5rem; font-size: 0.75rem; }
.code-block-header { display: flex; justify-content: space-between; background: #2b303b; color: #c0c5ce; padding: 0.25rem 0.75rem; font-size: 0.75rem; }
.code-block pre { margin-top: 0; overflow-x: auto; padding: 0.75rem; }
.post-image img { max-width: 100%; }
.post-image figcaption { text-align: center; font-size: 0.875rem; font-style: italic; color: #888; }
.table-wrap { overflow-x: auto; }
.error-page { text-align: center; margin-top: 4rem; }
</style>
"#;

fn body_class(config: &ViewerConfig) -> &'static str {
    match config.theme {
        ThemeMode::Dark => "theme-dark",
        ThemeMode::Light => "theme-light",
    }
}

fn page(config: &ViewerConfig, title: &str, body: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"en\">\n",
            "<head>\n",
            "<meta charset=\"utf-8\">\n",
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
            "<title>{title}</title>\n",
            "{style}",
            "</head>\n",
            "<body class=\"{class}\">\n",
            "{body}\n",
            "</body>\n",
            "</html>\n"
        ),
        title = html_escape(title),
        style = BASE_STYLE,
        class = body_class(config),
        body = body,
    )
}

/// Full page for one loaded post
pub fn post_page(post: &BlogPost, config: &ViewerConfig) -> String {
    let meta = &post.metadata;

    let mut body = String::new();
    body.push_str(r#"<a href="/">&larr; Back to Blog</a>"#);
    body.push_str("\n<header>\n");
    body.push_str(&format!("<h1>{}</h1>\n", html_escape(&meta.title)));
    body.push_str(&format!(
        r#"<p class="post-meta">{} &middot; {}</p>"#,
        html_escape(&display_date(&meta.date)),
        html_escape(&meta.read_time)
    ));
    body.push('\n');
    if !meta.tags.is_empty() {
        body.push_str(&tag_list(&meta.tags));
        body.push('\n');
    }
    body.push_str("</header>\n<article>\n");
    body.push_str(&post.content);
    body.push_str("\n</article>\n");
    body.push_str(COPY_SCRIPT);

    page(config, &format!("{} - {}", meta.title, config.title), &body)
}

/// Listing page over post summaries
pub fn listing_page(summaries: &[PostSummary], config: &ViewerConfig) -> String {
    let mut body = String::new();
    body.push_str(&format!("<h1>{}</h1>\n<ul>\n", html_escape(&config.title)));
    for summary in summaries {
        let meta = &summary.metadata;
        body.push_str(&format!(
            r#"<li><a href="{}">{}</a> <span class="post-meta">{}</span></li>"#,
            post_href(&meta.id),
            html_escape(&meta.title),
            html_escape(&display_date(&meta.date)),
        ));
        body.push('\n');
    }
    body.push_str("</ul>\n");

    page(config, &config.title, &body)
}

/// Non-fatal error page with a way back to the listing
pub fn error_page(message: &str, config: &ViewerConfig) -> String {
    let body = format!(
        concat!(
            r#"<div class="error-page">"#,
            "<h1>Blog Post Not Found</h1>\n",
            "<p>{message}</p>\n",
            r#"<a href="/">&larr; Back to Blog</a>"#,
            "</div>"
        ),
        message = html_escape(message),
    );

    page(config, &format!("Not Found - {}", config.title), &body)
}
