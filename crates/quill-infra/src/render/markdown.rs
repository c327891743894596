//! CommonMark rendering through pulldown-cmark, sanitized with ammonia.

use pulldown_cmark::{Options, Parser, html};

use quill_core::ports::ContentRenderer;

/// Renders markdown to HTML and strips anything unsafe before the result
/// leaves this type. Scripts, event handlers, and unknown tags never reach
/// the stored `html_content`.
pub struct MarkdownRenderer {
    options: Options,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_FOOTNOTES);

        Self { options }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentRenderer for MarkdownRenderer {
    fn render_html(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut raw = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut raw, parser);

        ammonia::clean(&raw)
    }
}
