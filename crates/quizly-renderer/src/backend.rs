//! Output format backends.

use pulldown_cmark::{Options, Parser, html};

/// An output format a document can be rendered to.
///
/// The backend renders the markdown between directives; node visitors are
/// registered per backend [`FORMAT`](Self::FORMAT) in the
/// [`Registry`](crate::Registry).
pub trait RenderBackend {
    /// Format name used as the second half of the visitor dispatch key.
    const FORMAT: &'static str;

    /// Render a markdown segment, appending to `out`.
    fn render_markdown(markdown: &str, out: &mut String);
}

/// HTML render backend built on pulldown-cmark.
pub struct HtmlBackend;

impl RenderBackend for HtmlBackend {
    const FORMAT: &'static str = "html";

    fn render_markdown(markdown: &str, out: &mut String) {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_TASKLISTS;
        html::push_html(out, Parser::new_ext(markdown, options));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_backend_renders_markdown() {
        let mut out = String::new();
        HtmlBackend::render_markdown("# Title\n\n**bold**", &mut out);
        assert!(out.contains("<h1>Title</h1>"));
        assert!(out.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_html_backend_appends() {
        let mut out = String::from("<!-- head -->");
        HtmlBackend::render_markdown("text", &mut out);
        assert!(out.starts_with("<!-- head -->"));
        assert!(out.ends_with("<p>text</p>\n"));
    }

    #[test]
    fn test_html_backend_tables() {
        let mut out = String::new();
        HtmlBackend::render_markdown("| a |\n|---|\n| 1 |", &mut out);
        assert!(out.contains("<table>"));
    }
}
