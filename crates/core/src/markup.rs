/// Separator between lines inside a `fit-text` block.
pub const LINE_BREAK: &str = "<br>";

/// Escape text for interpolation into element content or a quoted
/// attribute value.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Reverse of [`escape_html`] for the entities it produces. Used when
/// measuring rendered text, never for building markup.
pub fn unescape_html(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_script_tags() {
        assert_eq!(
            escape_html("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
    }

    #[test]
    fn escapes_ampersand_once() {
        assert_eq!(escape_html("R&D \"bay\""), "R&amp;D &quot;bay&quot;");
        assert_eq!(escape_html("&amp;"), "&amp;amp;");
    }

    #[test]
    fn unescape_inverts_escape() {
        let original = "Tom & Jerry's <b>\"shop\"</b> &amp;";
        assert_eq!(unescape_html(&escape_html(original)), original);
    }
}
