//! URL and path helper functions

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

/// Rewrite an image source so it resolves against the served root.
///
/// Authors sometimes reference images through the on-disk assets folder
/// (`public/img/a.png`), but at serve time that folder *is* the root. The
/// prefix is stripped and a single leading slash enforced; absolute paths
/// pass through unchanged and bare relative paths are forced absolute.
///
/// # Examples
/// ```ignore
/// fix_image_path("public/img/a.png", "public/") // -> "/img/a.png"
/// fix_image_path("/already/abs.png", "public/") // -> "/already/abs.png"
/// fix_image_path("rel/b.png", "public/")        // -> "/rel/b.png"
/// ```
pub fn fix_image_path(src: &str, assets_prefix: &str) -> String {
    if is_external(src) {
        return src.to_string();
    }

    if let Some(stripped) = src.strip_prefix(assets_prefix) {
        return format!("/{}", stripped.trim_start_matches('/'));
    }

    if src.starts_with('/') {
        return src.to_string();
    }

    format!("/{}", src)
}

/// Whether a URL points outside the site (http or https scheme)
pub fn is_external(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Build the route for a single post from its identifier
///
/// # Examples
/// ```ignore
/// post_href("hello-world") // -> "/posts/hello%2Dworld"
/// ```
pub fn post_href(id: &str) -> String {
    format!(
        "/posts/{}",
        utf8_percent_encode(id, NON_ALPHANUMERIC)
    )
}
