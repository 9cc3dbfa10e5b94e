/// Trim and HTML-escape user supplied text before it is stored.
pub fn sanitize_text(text: &str) -> String {
    escape_html(text.trim())
}

/// Escapes the five characters significant in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_text() {
        assert_eq!(
            sanitize_text("  <b>\"Tom\" & 'Jerry'</b> "),
            "&lt;b&gt;&#34;Tom&#34; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(sanitize_text("plain"), "plain");
    }
}
