//! Light, conservative minification of generated output.
//!
//! These passes only remove what is certainly insignificant: comments,
//! indentation, blank lines and whitespace next to block-level tags. Other
//! whitespace runs collapse to one space. They never rename, reorder or
//! rewrite tokens, so the output behaves exactly like the input.
//! `<pre>`, `<textarea>`, `<script>` and `<style>` bodies are copied verbatim
//! by the HTML pass.

/// Elements whose contents must survive byte for byte.
const RAW_ELEMENTS: [&str; 4] = ["pre", "textarea", "script", "style"];

/// Elements that never render whitespace around themselves.
const BLOCK_ELEMENTS: &[&str] = &[
    "!doctype", "html", "head", "body", "meta", "link", "title", "script", "style", "noscript",
    "main", "header", "footer", "nav", "section", "article", "aside", "div", "p", "h1", "h2",
    "h3", "h4", "h5", "h6", "ul", "ol", "li", "dl", "dt", "dd", "table", "thead", "tbody",
    "tfoot", "tr", "th", "td", "form", "fieldset", "figure", "figcaption", "blockquote", "hr",
    "details", "summary", "pre", "address",
];

pub fn minify_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    let mut pending_space = false;
    let mut after_block_tag = false;

    while let Some(c) = rest.chars().next() {
        if rest.starts_with("<!--") {
            rest = match rest.find("-->") {
                Some(end) => &rest[end + 3..],
                None => "",
            };
            continue;
        }
        if c == '<' {
            let tag_end = tag_end(rest);
            let tag = &rest[..tag_end];
            let block = is_block_tag(tag);
            // Between two tags the space only matters when both are inline.
            let between_tags = out.ends_with('>');
            if pending_space && !out.is_empty() && !(between_tags && (after_block_tag || block)) {
                out.push(' ');
            }
            pending_space = false;
            after_block_tag = block;
            out.push_str(&collapse_tag(tag));
            rest = &rest[tag_end..];

            if let Some(name) = raw_element(tag) {
                let close = format!("</{name}");
                let body_end = find_ascii_ci(rest, &close).unwrap_or(rest.len());
                out.push_str(&rest[..body_end]);
                rest = &rest[body_end..];
            }
            continue;
        }
        if c.is_whitespace() {
            pending_space = true;
        } else {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// Byte length of the tag starting at `s[0] == '<'`, quotes respected.
fn tag_end(s: &str) -> usize {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return i + 1,
            None => {}
        }
    }
    s.len()
}

/// Collapse whitespace runs inside a tag outside attribute values.
fn collapse_tag(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut quote: Option<char> = None;
    for c in tag.chars() {
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push(c);
            }
            '>' => {
                while out.ends_with(' ') {
                    out.pop();
                }
                out.push('>');
            }
            _ if c.is_whitespace() => {
                if !out.ends_with(' ') && !out.ends_with('<') {
                    out.push(' ');
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Lowercased element name of a tag, without the `/` of a closing tag.
fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '!')
        .collect::<String>()
        .to_ascii_lowercase()
}

fn is_block_tag(tag: &str) -> bool {
    let name = tag_name(tag);
    BLOCK_ELEMENTS.contains(&name.as_str())
}

/// Name of the raw element this opening tag starts, if any.
fn raw_element(tag: &str) -> Option<&'static str> {
    let name: String = tag[1..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    if tag.ends_with("/>") {
        return None;
    }
    RAW_ELEMENTS.into_iter().find(|raw| *raw == name)
}

fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

/// Strip comments and insignificant whitespace from a stylesheet.
///
/// String literals (`content: "+"`) are copied unchanged.
pub fn minify_css(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut pending_space = false;

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '"' | '\'' => {
                flush_space(&mut out, &mut pending_space);
                out.push(c);
                let mut escaped = false;
                for s in chars.by_ref() {
                    out.push(s);
                    if escaped {
                        escaped = false;
                    } else if s == '\\' {
                        escaped = true;
                    } else if s == c {
                        break;
                    }
                }
            }
            _ if c.is_whitespace() => pending_space = true,
            '{' | '}' | ';' | ',' | '>' => {
                pending_space = false;
                if c == '}' && out.ends_with(';') {
                    out.pop();
                }
                out.push(c);
            }
            ':' => {
                // `a :hover` differs from `a:hover`, so only the space after goes.
                flush_space(&mut out, &mut pending_space);
                out.push(c);
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
            }
            _ => {
                flush_space(&mut out, &mut pending_space);
                out.push(c);
            }
        }
    }
    out
}

fn flush_space(out: &mut String, pending: &mut bool) {
    if *pending
        && !out.is_empty()
        && !out.ends_with(['{', '}', ';', ',', '>', ':', '('])
    {
        out.push(' ');
    }
    *pending = false;
}

/// Drop comment lines, blank lines and indentation from a script.
///
/// Lines stay separate so automatic semicolon insertion is unaffected.
pub fn minify_js(input: &str) -> String {
    let mut out = Vec::new();
    let mut in_block_comment = false;
    for line in input.lines().map(str::trim) {
        if in_block_comment {
            if line.ends_with("*/") {
                in_block_comment = false;
            }
            continue;
        }
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if line.starts_with("/*") {
            in_block_comment = !line.ends_with("*/");
            continue;
        }
        out.push(line);
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_drops_whitespace_between_tags() {
        let src = "<ul>\n    <li>One</li>\n    <li>Two</li>\n</ul>\n";
        assert_eq!(minify_html(src), "<ul><li>One</li><li>Two</li></ul>");
    }

    #[test]
    fn html_keeps_single_space_in_text() {
        assert_eq!(
            minify_html("<p>Hello\n      <b>big</b>   world</p>"),
            "<p>Hello <b>big</b> world</p>"
        );
    }

    #[test]
    fn html_keeps_space_between_inline_elements() {
        assert_eq!(
            minify_html("<p><strong>a</strong>\n   <em>b</em></p>"),
            "<p><strong>a</strong> <em>b</em></p>"
        );
        assert_eq!(
            minify_html("<nav>\n  <a href=\"/\">Home</a>\n  <a href=\"/x/\">X</a>\n</nav>"),
            "<nav><a href=\"/\">Home</a> <a href=\"/x/\">X</a></nav>"
        );
    }

    #[test]
    fn html_preserves_attribute_values() {
        let src = "<input\n  type=\"text\"\n  placeholder=\"A   B\"\n/>";
        assert_eq!(minify_html(src), "<input type=\"text\" placeholder=\"A   B\" />");
    }

    #[test]
    fn html_strips_comments() {
        assert_eq!(minify_html("<p>a<!-- note -->b</p>"), "<p>ab</p>");
    }

    #[test]
    fn html_leaves_raw_elements_alone() {
        let src = "<pre>  keep\n   this </pre>\n<script>\nvar a = 1;\n</script>";
        assert_eq!(
            minify_html(src),
            "<pre>  keep\n   this </pre><script>\nvar a = 1;\n</script>"
        );
    }

    #[test]
    fn css_collapses_rules() {
        let src = "/* base */\n.a ,\n.b {\n    color: red;\n    margin: 0 auto;\n}\n";
        assert_eq!(minify_css(src), ".a,.b{color:red;margin:0 auto}");
    }

    #[test]
    fn css_keeps_descendant_pseudo_space_and_strings() {
        let src = ".x :hover { content: \"a  b\"; }";
        assert_eq!(minify_css(src), ".x :hover{content:\"a  b\"}");
    }

    #[test]
    fn css_keeps_function_arguments() {
        assert_eq!(
            minify_css("a { grid-template-columns: repeat(var(--c, 3), 1fr); }"),
            "a{grid-template-columns:repeat(var(--c,3),1fr)}"
        );
    }

    #[test]
    fn js_removes_comments_and_indentation() {
        let src = "/* header */\n(function () {\n    // note\n    var a = 1;\n\n    /*\n     * block\n     */\n    go(a);\n})();\n";
        assert_eq!(minify_js(src), "(function () {\nvar a = 1;\ngo(a);\n})();");
    }
}
