//! Markdown rendering with HTML sanitization.

pub mod markdown;

pub use markdown::MarkdownRenderer;
