//! Markdown to HTML for the alternative part of Markdown messages

use pulldown_cmark::{html, Options, Parser};

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
        pre { background-color: #f4f4f4; padding: 10px; border-radius: 4px; overflow-x: auto; }
        code { background-color: #f4f4f4; padding: 2px 4px; border-radius: 3px; }
        table { border-collapse: collapse; }
        th, td { border: 1px solid #ddd; padding: 6px 10px; }
        blockquote { border-left: 4px solid #ddd; margin: 0; padding-left: 12px; color: #666; }
    </style>
</head>
<body>
"#;

const HTML_TAIL: &str = "</body>\n</html>\n";

/// Render Markdown to an HTML fragment
pub fn markdown_to_html_fragment(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Render Markdown into a complete, styled HTML document
pub fn markdown_to_html(markdown: &str) -> String {
    let fragment = markdown_to_html_fragment(markdown);
    let mut doc = String::with_capacity(HTML_HEAD.len() + fragment.len() + HTML_TAIL.len());
    doc.push_str(HTML_HEAD);
    doc.push_str(&fragment);
    doc.push_str(HTML_TAIL);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_basic_markup() {
        let html = markdown_to_html_fragment("# Title\n\nSome **bold** text");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_fragment_tables() {
        let html = markdown_to_html_fragment("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_fenced_code() {
        let html = markdown_to_html_fragment("```\nlet x = 1;\n```\n");
        assert!(html.contains("<pre><code>"));
    }

    #[test]
    fn test_document_wraps_fragment() {
        let doc = markdown_to_html("Hello *world*");
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<style>"));
        assert!(doc.contains("<em>world</em>"));
        assert!(doc.trim_end().ends_with("</html>"));
    }
}
