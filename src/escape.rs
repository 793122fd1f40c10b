//! Text escaping for output assembled outside maud.
//!
//! Page markup goes through maud, which escapes every interpolation. A few
//! outputs are plain strings (sitemap XML, CSS custom properties, inline
//! error text) and use these helpers instead.

/// Escape `& < > " '` for embedding in HTML or XML text and attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// True if `value` can be dropped into a CSS declaration value as-is.
///
/// Rejects anything that could close the declaration or the rule, open a
/// comment, or break out of a `<style>` element.
pub fn is_safe_css_value(value: &str) -> bool {
    !value.trim().is_empty()
        && !value.contains(['{', '}', ';', '<', '>', '\\', '"', '\'', '\n', '\r'])
        && !value.contains("/*")
}

/// Quote a URL for a CSS `url("…")`. Returns `None` for unsafe input.
pub fn css_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty()
        || url.contains(['"', '\\', '\n', '\r', '<', '>', '(', ')'])
        || url.to_ascii_lowercase().starts_with("javascript:")
    {
        return None;
    }
    Some(format!("url(\"{url}\")"))
}
