//! Markdown rendering pipeline
//!
//! Built on a pulldown-cmark event stream: extension syntax (tables,
//! strikethrough, task lists, footnotes, math) is enabled at parse time,
//! then selected node kinds are intercepted and replaced with customized
//! HTML before the stream is serialized. Raw HTML in the source passes
//! through untouched. Content-level malformation never fails a render;
//! unrecognized syntax simply comes out as literal text.

use anyhow::Result;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::helpers::url::{fix_image_path, is_external};

/// A fenced or indented code block captured during rendering.
///
/// `id` is scoped to a single render and only keys the block's copy state;
/// `text` is the trimmed literal content handed to the clipboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub id: String,
    pub language: Option<String>,
    pub label: String,
    pub text: String,
}

/// Output of one render pass
#[derive(Debug, Clone)]
pub struct RenderedContent {
    pub html: String,
    pub code_blocks: Vec<CodeBlock>,
}

/// Markdown renderer with syntax highlighting and math support
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    math_enabled: bool,
    assets_prefix: String,
}

impl MarkdownRenderer {
    /// Create a new renderer with default (dark) settings
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", true, "public/")
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, math_enabled: bool, assets_prefix: &str) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            math_enabled,
            assets_prefix: assets_prefix.to_string(),
        }
    }

    /// Render a metadata-stripped markdown body.
    ///
    /// Pure: the same input and settings always produce the same output,
    /// including the generated code-block ids.
    pub fn render(&self, markdown: &str) -> Result<RenderedContent> {
        let mut options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        if self.math_enabled {
            options |= Options::ENABLE_MATH;
        }
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code_blocks: Vec<CodeBlock> = Vec::new();

        let mut in_code_block = false;
        let mut code_lang: Option<String> = None;
        let mut code_buf = String::new();
        let mut image: Option<ImageCapture> = None;

        for event in parser {
            // An open image consumes its own subtree; only the text content
            // survives, concatenated into the alt/caption.
            if image.is_some() {
                match event {
                    Event::Text(text) | Event::Code(text) => {
                        if let Some(capture) = image.as_mut() {
                            capture.alt.push_str(&text);
                        }
                    }
                    Event::End(TagEnd::Image) => {
                        if let Some(capture) = image.take() {
                            events.push(Event::Html(CowStr::from(self.image_html(&capture))));
                        }
                    }
                    _ => {}
                }
                continue;
            }

            if in_code_block {
                match event {
                    Event::Text(text) => code_buf.push_str(&text),
                    Event::End(TagEnd::CodeBlock) => {
                        let index = code_blocks.len();
                        let (html, block) =
                            self.code_block_html(&code_buf, code_lang.as_deref(), index);
                        events.push(Event::Html(CowStr::from(html)));
                        code_blocks.push(block);
                        in_code_block = false;
                        code_lang = None;
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    code_lang = match kind {
                        CodeBlockKind::Fenced(lang) => fence_token(&lang),
                        CodeBlockKind::Indented => None,
                    };
                    code_buf.clear();
                    in_code_block = true;
                }
                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) => {
                    image = Some(ImageCapture {
                        dest: dest_url.to_string(),
                        title: title.to_string(),
                        alt: String::new(),
                    });
                }
                Event::Start(Tag::Link {
                    dest_url, title, ..
                }) => {
                    events.push(Event::Html(CowStr::from(link_open_html(
                        &dest_url, &title,
                    ))));
                }
                Event::End(TagEnd::Link) => {
                    events.push(Event::Html(CowStr::from("</a>")));
                }
                Event::Start(Tag::Heading { level, .. }) => {
                    events.push(Event::Html(CowStr::from(format!(
                        r#"<{} class="post-heading">"#,
                        heading_tag(level)
                    ))));
                }
                Event::End(TagEnd::Heading(level)) => {
                    events.push(Event::Html(CowStr::from(format!(
                        "</{}>",
                        heading_tag(level)
                    ))));
                }
                Event::Start(Tag::BlockQuote(..)) => {
                    events.push(Event::Html(CowStr::from(
                        r#"<blockquote class="post-quote">"#,
                    )));
                }
                Event::End(TagEnd::BlockQuote(..)) => {
                    events.push(Event::Html(CowStr::from("</blockquote>")));
                }
                Event::Start(Tag::Table(_)) => {
                    events.push(Event::Html(CowStr::from(r#"<div class="table-wrap">"#)));
                    events.push(event);
                }
                Event::End(TagEnd::Table) => {
                    events.push(event);
                    events.push(Event::Html(CowStr::from("</div>")));
                }
                Event::Code(code) => {
                    events.push(Event::Html(CowStr::from(format!(
                        r#"<code class="inline-code">{}</code>"#,
                        html_escape(&code)
                    ))));
                }
                Event::InlineMath(math) => {
                    events.push(Event::Html(CowStr::from(self.math_html(&math, false))));
                }
                Event::DisplayMath(math) => {
                    events.push(Event::Html(CowStr::from(self.math_html(&math, true))));
                }
                Event::Html(raw) if raw.contains("<video") => {
                    // Raw markup passthrough; video embeds only pick up a
                    // presentational class.
                    let tagged = raw.replace("<video", r#"<video class="post-video""#);
                    events.push(Event::Html(CowStr::from(tagged)));
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(RenderedContent {
            html: html_output,
            code_blocks,
        })
    }

    /// Build a code block with its header (language label + copy button)
    fn code_block_html(
        &self,
        code: &str,
        lang: Option<&str>,
        index: usize,
    ) -> (String, CodeBlock) {
        let id = format!("code-{}", index);
        let label = display_language(lang);

        let body = match lang {
            Some(lang) => self.highlight_code(code, lang),
            None => format!("<pre><code>{}</code></pre>", html_escape(code)),
        };

        let html = format!(
            concat!(
                r#"<div class="code-block" id="{id}">"#,
                r#"<div class="code-block-header">"#,
                r#"<span class="code-block-lang">{label}</span>"#,
                r#"<button type="button" class="copy-button" data-code-id="{id}">Copy</button>"#,
                "</div>{body}</div>"
            ),
            id = id,
            label = html_escape(&label),
            body = body,
        );

        let block = CodeBlock {
            id,
            language: lang.map(str::to_string),
            label,
            text: code.trim().to_string(),
        };

        (html, block)
    }

    /// Highlight a code block, falling back to an escaped plain block
    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .unwrap_or_else(|| {
                self.theme_set
                    .themes
                    .values()
                    .next()
                    .expect("No themes available")
            });

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) => highlighted,
            Err(_) => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                html_escape(lang),
                html_escape(code)
            ),
        }
    }

    /// Render a math expression, degrading to the literal text on failure
    fn math_html(&self, literal: &str, display_mode: bool) -> String {
        let opts = katex::OptsBuilder::default()
            .display_mode(display_mode)
            .output_type(katex::OutputType::Html)
            .build();

        let rendered = match opts {
            Ok(opts) => katex::render_with_opts(literal, opts),
            Err(e) => {
                tracing::warn!("failed to build KaTeX options: {}", e);
                return math_fallback(literal, display_mode);
            }
        };

        match rendered {
            Ok(html) if display_mode => format!(r#"<div class="math-display">{}</div>"#, html),
            Ok(html) => format!(r#"<span class="math-inline">{}</span>"#, html),
            Err(e) => {
                tracing::warn!("KaTeX rendering failed: {}", e);
                math_fallback(literal, display_mode)
            }
        }
    }

    /// Build an image figure with path fix-up and an alt-text caption.
    /// A broken image hides itself instead of showing a placeholder.
    fn image_html(&self, capture: &ImageCapture) -> String {
        let src = fix_image_path(&capture.dest, &self.assets_prefix);

        let mut out = format!(
            r#"<figure class="post-image"><img src="{}" alt="{}" loading="lazy" onerror="this.style.display='none'""#,
            html_escape(&src),
            html_escape(&capture.alt)
        );
        if !capture.title.is_empty() {
            out.push_str(&format!(r#" title="{}""#, html_escape(&capture.title)));
        }
        out.push('>');
        if !capture.alt.is_empty() {
            out.push_str(&format!(
                "<figcaption>{}</figcaption>",
                html_escape(&capture.alt)
            ));
        }
        out.push_str("</figure>");
        out
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct ImageCapture {
    dest: String,
    title: String,
    alt: String,
}

/// Opening anchor tag; external targets open in a new browsing context
/// without a back-reference to the opener
fn link_open_html(dest: &str, title: &str) -> String {
    let mut out = format!(r#"<a href="{}""#, html_escape(dest));
    if is_external(dest) {
        out.push_str(r#" target="_blank" rel="noopener noreferrer""#);
    }
    if !title.is_empty() {
        out.push_str(&format!(r#" title="{}""#, html_escape(title)));
    }
    out.push('>');
    out
}

/// Fallback for math rendering: when KaTeX is unavailable or errors, the
/// expression degrades to its escaped literal source (spec: "degrades to the
/// raw string"), keeping the same presentational container as a success.
fn math_fallback(literal: &str, display_mode: bool) -> String {
    if display_mode {
        format!(r#"<div class="math-display">{}</div>"#, html_escape(literal))
    } else {
        format!(r#"<span class="math-inline">{}</span>"#, html_escape(literal))
    }
}

/// First token of a fence info string ("rust,no_run" -> "rust")
fn fence_token(info: &str) -> Option<String> {
    let token: String = info
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Map a language tag to a human-readable display label
fn display_language(lang: Option<&str>) -> String {
    let Some(lang) = lang else {
        return "CODE".to_string();
    };

    match lang.to_lowercase().as_str() {
        "js" | "javascript" => "JavaScript",
        "ts" | "typescript" => "TypeScript",
        "py" | "python" => "Python",
        "java" => "Java",
        "cpp" => "C++",
        "c" => "C",
        "cs" => "C#",
        "php" => "PHP",
        "rb" | "ruby" => "Ruby",
        "go" => "Go",
        "rs" | "rust" => "Rust",
        "sh" => "Shell",
        "bash" => "Bash",
        "sql" => "SQL",
        "html" => "HTML",
        "css" => "CSS",
        "scss" => "SCSS",
        "json" => "JSON",
        "xml" => "XML",
        "yaml" | "yml" => "YAML",
        "dockerfile" => "Dockerfile",
        "md" | "markdown" => "Markdown",
        _ => return lang.to_uppercase(),
    }
    .to_string()
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> MarkdownRenderer {
        MarkdownRenderer::new()
    }

    #[test]
    fn test_render_basic_markdown() {
        let out = renderer().render("# Hello World\n\nThis is a test.").unwrap();
        assert!(out.html.contains(r#"<h1 class="post-heading">Hello World</h1>"#));
        assert!(out.html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_code_block_header_and_record() {
        let out = renderer()
            .render("```py\nprint('x')\n```")
            .unwrap();

        assert!(out.html.contains(r#"<div class="code-block" id="code-0">"#));
        assert!(out.html.contains(r#"<span class="code-block-lang">Python</span>"#));
        assert!(out.html.contains(r#"data-code-id="code-0""#));

        assert_eq!(out.code_blocks.len(), 1);
        let block = &out.code_blocks[0];
        assert_eq!(block.id, "code-0");
        assert_eq!(block.language.as_deref(), Some("py"));
        assert_eq!(block.label, "Python");
        assert_eq!(block.text, "print('x')");
    }

    #[test]
    fn test_unknown_language_label_uppercased() {
        assert_eq!(display_language(Some("zig")), "ZIG");
        assert_eq!(display_language(None), "CODE");
    }

    #[test]
    fn test_untagged_fence_gets_generic_header() {
        let out = renderer().render("```\nplain text\n```").unwrap();
        assert!(out.html.contains(r#"<span class="code-block-lang">CODE</span>"#));
        assert_eq!(out.code_blocks[0].language, None);
    }

    #[test]
    fn test_block_ids_are_sequential_and_deterministic() {
        let md = "```rs\na\n```\n\ntext\n\n```go\nb\n```";
        let first = renderer().render(md).unwrap();
        let second = renderer().render(md).unwrap();

        let ids: Vec<_> = first.code_blocks.iter().map(|b| b.id.clone()).collect();
        assert_eq!(ids, vec!["code-0", "code-1"]);
        assert_eq!(
            ids,
            second
                .code_blocks
                .iter()
                .map(|b| b.id.clone())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_inline_code_styling() {
        let out = renderer().render("use `let x = 1` here").unwrap();
        assert!(out.html.contains(r#"<code class="inline-code">let x = 1</code>"#));
        assert!(out.code_blocks.is_empty());
    }

    #[test]
    fn test_image_path_rewritten_with_caption() {
        let out = renderer()
            .render("![A diagram](public/img/a.png)")
            .unwrap();
        assert!(out.html.contains(r#"src="/img/a.png""#));
        assert!(out.html.contains("onerror=\"this.style.display='none'\""));
        assert!(out.html.contains("<figcaption>A diagram</figcaption>"));
    }

    #[test]
    fn test_image_without_alt_has_no_caption() {
        let out = renderer().render("![](rel/b.png)").unwrap();
        assert!(out.html.contains(r#"src="/rel/b.png""#));
        assert!(!out.html.contains("figcaption"));
    }

    #[test]
    fn test_external_link_opens_new_context() {
        let out = renderer()
            .render("[site](https://example.com)")
            .unwrap();
        assert!(out
            .html
            .contains(r#"<a href="https://example.com" target="_blank" rel="noopener noreferrer">"#));
    }

    #[test]
    fn test_internal_link_untouched() {
        let out = renderer().render("[back](/posts/other)").unwrap();
        assert!(out.html.contains(r#"<a href="/posts/other">"#));
        assert!(!out.html.contains("target=\"_blank\""));
    }

    #[test]
    fn test_table_wrapped() {
        let md = "| a | b |\n| - | - |\n| 1 | 2 |";
        let out = renderer().render(md).unwrap();

        let wrap = out.html.find(r#"<div class="table-wrap">"#).unwrap();
        let table_open = out.html.find("<table>").unwrap();
        let table_close = out.html.find("</table>").unwrap();
        let wrap_close = out.html.rfind("</div>").unwrap();
        assert!(wrap < table_open && table_close < wrap_close);
    }

    #[test]
    fn test_strikethrough_extension() {
        let out = renderer().render("~~gone~~").unwrap();
        assert!(out.html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_blockquote_class() {
        let out = renderer().render("> quoted").unwrap();
        assert!(out.html.contains(r#"<blockquote class="post-quote">"#));
    }

    #[test]
    fn test_inline_math_rendered() {
        let out = renderer().render("before $x^2$ after").unwrap();
        assert!(out.html.contains(r#"<span class="math-inline">"#));
        assert!(!out.html.contains("$x^2$"));
    }

    #[test]
    fn test_math_disabled_leaves_delimiters() {
        let r = MarkdownRenderer::with_options("base16-ocean.dark", false, "public/");
        let out = r.render("before $x^2$ after").unwrap();
        assert!(out.html.contains("$x^2$"));
    }

    #[test]
    fn test_video_passthrough_with_class() {
        let out = renderer()
            .render("<video src=\"/clip.mp4\" controls></video>\n")
            .unwrap();
        assert!(out.html.contains(r#"<video class="post-video" src="/clip.mp4""#));
    }

    #[test]
    fn test_raw_html_passthrough() {
        let out = renderer().render("a <b>bold</b> claim").unwrap();
        assert!(out.html.contains("<b>bold</b>"));
    }
}
