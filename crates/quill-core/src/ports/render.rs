/// Markdown rendering collaborator.
///
/// Implementations must return HTML that is already sanitized; the workflow
/// stores the result verbatim and never serves markdown-derived HTML that
/// has not passed through this seam.
pub trait ContentRenderer: Send + Sync {
    fn render_html(&self, markdown: &str) -> String;
}
