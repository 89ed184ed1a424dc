use html_escape::encode_text;

/// Renders the small markdown subset summaries come back in.
///
/// `#`, `##` and `###` headings, `1.` and `*` list items, every other
/// non-blank line a paragraph. All text is HTML-escaped.
pub fn render_markdown(text: &str) -> String {
    text.lines()
        .map(|line| render_line(line.trim_end()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_line(line: &str) -> String {
    if line.trim().is_empty() {
        return String::new();
    }

    if let Some(rest) = line.strip_prefix("### ") {
        return format!("<h3>{}</h3>", encode_text(rest));
    }
    if let Some(rest) = line.strip_prefix("## ") {
        return format!("<h2>{}</h2>", encode_text(rest));
    }
    if let Some(rest) = line.strip_prefix("# ") {
        return format!("<h1>{}</h1>", encode_text(rest));
    }
    if let Some(rest) = numbered_item(line).or_else(|| line.strip_prefix("* ")) {
        return format!("<li>{}</li>", encode_text(rest));
    }
    format!("<p>{}</p>", encode_text(line))
}

/// The text after a leading `12. ` marker.
fn numbered_item(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix(". ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_lists_and_paragraphs() {
        let html = render_markdown("# Title\n## Sub\n### Minor\n1. first\n12. twelfth\n* bullet\n\nplain text");
        assert_eq!(
            html,
            "<h1>Title</h1>\n<h2>Sub</h2>\n<h3>Minor</h3>\n<li>first</li>\n<li>twelfth</li>\n<li>bullet</li>\n\n<p>plain text</p>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(
            render_markdown("<script>alert(1)</script> & more"),
            "<p>&lt;script&gt;alert(1)&lt;/script&gt; &amp; more</p>"
        );
        assert_eq!(render_markdown("* <b>"), "<li>&lt;b&gt;</li>");
    }

    #[test]
    fn test_non_list_numbers_stay_paragraphs() {
        assert_eq!(render_markdown("2024 was a year"), "<p>2024 was a year</p>");
        assert_eq!(render_markdown("3.5 stars"), "<p>3.5 stars</p>");
    }
}
